use dioxus::prelude::*;

/// Titled content box. A failure inside it collapses to an error header.
#[allow(non_snake_case)]
#[component]
pub fn MainContent(
    header: String,
    #[props(default)] extra_class: String,
    children: Element,
) -> Element {
    rsx! {
        ErrorBoundary {
            handle_error: |_errors: ErrorContext| rsx! {
                div { class: "content content-rounded-border-box",
                    div { class: "content-header", span { "Error Component Failed" } }
                    div { class: "content-body" }
                }
            },
            div { class: "content content-rounded-border-box",
                div { class: "content-header", span { "{header}" } }
                div { class: "content-body {extra_class}", {children} }
            }
        }
    }
}

/// Untitled body. A failure inside it leaves an empty body behind.
#[allow(non_snake_case)]
#[component]
pub fn ContentBody(#[props(default)] extra_class: String, children: Element) -> Element {
    rsx! {
        ErrorBoundary {
            handle_error: |_errors: ErrorContext| rsx! { div { class: "content-body" } },
            div { class: "content-body {extra_class}", {children} }
        }
    }
}
