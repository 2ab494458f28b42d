use dioxus::prelude::*;

/// Header/body layout shared by the login and main pages.
#[allow(non_snake_case)]
#[component]
pub fn Page(header: Element, children: Element) -> Element {
    rsx! {
        div { id: "app",
            header { class: "page-header", {header} }
            main { class: "page-body", {children} }
        }
    }
}
