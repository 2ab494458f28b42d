use dioxus::prelude::*;

use crate::components::Page;
use crate::utils::browser::login_href;

#[allow(non_snake_case)]
#[component]
pub fn LoginPage() -> Element {
    let href = use_hook(login_href);
    rsx! {
        Page { header: rsx! { span { "Welcome" } },
            div { id: "login-container", class: "content-rounded-border-box content",
                h1 { "Please log in to continue" }
                a { href: "{href}", class: "content-rounded-border-box content-inner",
                    span { "Log in with GitHub (OAuth2)" }
                }
            }
        }
    }
}
