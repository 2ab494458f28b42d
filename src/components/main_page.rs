use dioxus::prelude::*;

use crate::components::presets::{
    AverageDailySpendingGroup, AverageMonthlySpendingGroup, DailySpendingGroup,
    MonthlySpendingGroup, ReadingTable, WeeklySpendingGroup,
};
use crate::components::{NewReadingForm, Page, SummaryCard};
use crate::utils::media::{use_prefers_dark, DarkMode};

#[allow(non_snake_case)]
#[component]
pub fn MainPage(full_name: String, user_name: String, on_logout: EventHandler<()>) -> Element {
    let is_dark = use_prefers_dark();
    use_context_provider(|| DarkMode(is_dark));

    rsx! {
        Page {
            header: rsx! {
                span {
                    span { "Welcome " }
                    span { class: "tooltip", "{full_name}"
                        div { class: "tooltip-text header-inner header-inner-with-border",
                            a { href: "https://github.com/{user_name}", target: "_blank", rel: "noopener noreferrer",
                                "GitHub: {user_name}"
                            }
                        }
                    }
                }
                button { class: "header-inner header-inner-with-border",
                    onclick: move |_| on_logout.call(()),
                    "Logout"
                }
            },
            SummaryCard {}
            DailySpendingGroup {}
            WeeklySpendingGroup {}
            MonthlySpendingGroup {}
            AverageDailySpendingGroup {}
            AverageMonthlySpendingGroup {}
            ReadingTable {}
            NewReadingForm {}
        }
    }
}
