use dioxus::prelude::*;

use crate::components::{Chart, ContentBody, DataTable};
use crate::shared::descriptor::GroupDescriptor;
use crate::utils::storage::{use_saved_preference, ViewPreference};

fn display(visible: bool) -> &'static str {
    if visible {
        "display:unset"
    } else {
        "display:none"
    }
}

/// Chart and table of one dataset behind a Table/Chart toggle. Both stay
/// mounted so switching never refetches.
#[allow(non_snake_case)]
#[component]
pub fn GroupView(group: GroupDescriptor) -> Element {
    let mut visible = use_saved_preference(group.storage_key(), ViewPreference::Table);
    let current = visible.get();

    rsx! {
        ErrorBoundary {
            handle_error: |_errors: ErrorContext| rsx! { ContentBody {} },
            div { class: "content content-rounded-border-box",
                div { class: "content-header content-header-group",
                    span { "{group.header}" }
                    div { class: "content-header-group",
                        button {
                            disabled: current == ViewPreference::Table,
                            class: if current == ViewPreference::Chart { "content-body-selectable" },
                            onclick: move |_| visible.set(ViewPreference::Table),
                            "Table"
                        }
                        span { class: "content-body-button-divider" }
                        button {
                            disabled: current == ViewPreference::Chart,
                            class: if current == ViewPreference::Table { "content-body-selectable" },
                            onclick: move |_| visible.set(ViewPreference::Chart),
                            "Chart"
                        }
                    }
                }
                div { class: "content-body", style: display(current == ViewPreference::Chart),
                    Chart { descriptor: group.chart.clone() }
                }
                div { class: "content-body", style: display(current == ViewPreference::Table),
                    DataTable { descriptor: group.table.clone() }
                }
            }
        }
    }
}

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::*;
    use crate::shared::descriptor::weekly_spending;
    use crate::utils::storage::{save_preference, MemoryStore};
    use dioxus::dioxus_core::NoOpMutations;
    use std::time::Duration;

    /// Runs effects and resources until the dom goes quiet.
    async fn settle(dom: &mut VirtualDom) {
        for _ in 0..10 {
            let work = tokio::time::timeout(Duration::from_millis(50), dom.wait_for_work());
            if work.await.is_err() {
                break;
            }
            dom.render_immediate(&mut NoOpMutations);
        }
    }

    async fn mount(group: GroupDescriptor) -> String {
        let mut dom = VirtualDom::new_with_props(GroupView, GroupViewProps { group });
        dom.rebuild_in_place();
        settle(&mut dom).await;
        dioxus_ssr::render(&dom)
    }

    /// (chart visible, table visible); the chart body comes first.
    fn visible(html: &str) -> (bool, bool) {
        let shown = html.find("display:unset").unwrap();
        let hidden = html.find("display:none").unwrap();
        (shown < hidden, hidden < shown)
    }

    #[tokio::test]
    async fn table_is_shown_when_nothing_was_saved() {
        let html = mount(weekly_spending()).await;
        assert!(html.contains("Weekly Spending"));
        assert_eq!(visible(&html), (false, true));
    }

    #[tokio::test]
    async fn saved_chart_choice_is_restored_on_mount() {
        let group = weekly_spending();
        save_preference(&MemoryStore, &group.storage_key(), ViewPreference::Chart);
        let html = mount(group).await;
        assert_eq!(visible(&html), (true, false));
    }
}
