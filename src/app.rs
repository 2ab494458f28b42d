use dioxus::prelude::*;

use crate::api::{logout, probe_user};
use crate::components::{LoginPage, MainPage};
use crate::shared::types::AuthState;
use crate::MAIN_CSS;

#[allow(non_snake_case)]
#[component]
pub fn App() -> Element {
    // Re-probed after every logout; "checking" renders like "logged out"
    let mut auth = use_resource(|| async move { probe_user().await });
    let state = auth.read_unchecked().clone().unwrap_or_default();

    rsx! {
        document::Stylesheet { href: MAIN_CSS }
        document::Meta { name: "color-scheme", content: "light dark" }
        AuthView {
            state,
            on_logout: move |_| async move {
                logout().await;
                auth.restart();
            },
        }
    }
}

/// Chooses between the login prompt and the dashboard.
#[allow(non_snake_case)]
#[component]
pub fn AuthView(state: AuthState, on_logout: EventHandler<()>) -> Element {
    match state {
        AuthState::Authenticated(user) => rsx! {
            MainPage {
                full_name: user.full_name,
                user_name: user.user_name,
                on_logout,
            }
        },
        AuthState::Anonymous => rsx! { LoginPage {} },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(non_snake_case)]
    #[component]
    fn Harness(state: AuthState) -> Element {
        rsx! { AuthView { state, on_logout: |_| {} } }
    }

    fn render(state: AuthState) -> String {
        let mut dom = VirtualDom::new_with_props(Harness, HarnessProps { state });
        dom.rebuild_in_place();
        dioxus_ssr::render(&dom)
    }

    #[test]
    fn anonymous_renders_login_prompt() {
        let html = render(AuthState::Anonymous);
        assert!(html.contains("Please log in to continue"));
        assert!(html.contains("/api/private"));
        assert!(!html.contains("Logout"));
    }

    #[test]
    fn successful_probe_renders_main_page_with_name() {
        let state = AuthState::from_probe::<()>(Ok(
            r#"{"userName":"ada","fullName":"Ada Lovelace"}"#.to_string(),
        ));
        let html = render(state);
        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains("https://github.com/ada"));
        assert!(html.contains("Logout"));
        assert!(!html.contains("Please log in to continue"));
    }

    #[test]
    fn failed_probe_renders_login_prompt() {
        let html = render(AuthState::from_probe(Err("connection refused")));
        assert!(html.contains("Please log in to continue"));
    }
}
