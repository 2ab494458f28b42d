//! Small wrappers over browser APIs. Outside the browser they fall back to
//! values that keep server rendering deterministic.

#[cfg(feature = "web")]
pub fn xsrf_token() -> Option<String> {
    use crate::shared::cookies::{cookie_value, XSRF_COOKIE};
    use wasm_bindgen::JsCast;
    let document = web_sys::window()?.document()?;
    let html = document.dyn_into::<web_sys::HtmlDocument>().ok()?;
    let cookies = html.cookie().ok()?;
    cookie_value(&cookies, XSRF_COOKIE)
}

#[cfg(not(feature = "web"))]
pub fn xsrf_token() -> Option<String> {
    None
}

#[cfg(feature = "web")]
pub fn reload() {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.location().reload() {
            dioxus::logger::tracing::warn!("[browser] reload failed: {e:?}");
        }
    }
}

#[cfg(not(feature = "web"))]
pub fn reload() {}

/// Where the login link points. During local development the page is served
/// by the dev server on :3000 while the API lives on :8080.
#[cfg(feature = "web")]
pub fn login_href() -> String {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return LOGIN_PATH.to_string();
    };
    let protocol = location.protocol().unwrap_or_default();
    let host = location.hostname().unwrap_or_default();
    let port = location.port().unwrap_or_default();
    login_href_for(&protocol, &host, &port)
}

#[cfg(not(feature = "web"))]
pub fn login_href() -> String {
    LOGIN_PATH.to_string()
}

pub const LOGIN_PATH: &str = "/api/private";

pub fn login_href_for(protocol: &str, host: &str, port: &str) -> String {
    if host.is_empty() {
        return LOGIN_PATH.to_string();
    }
    let port = match port {
        "" => String::new(),
        "3000" => ":8080".to_string(),
        p => format!(":{p}"),
    };
    format!("{protocol}//{host}{port}{LOGIN_PATH}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_href_rewrites_the_dev_port() {
        assert_eq!(
            login_href_for("http:", "localhost", "3000"),
            "http://localhost:8080/api/private"
        );
        assert_eq!(
            login_href_for("https:", "energy.example.org", ""),
            "https://energy.example.org/api/private"
        );
        assert_eq!(login_href_for("http:", "", ""), "/api/private");
    }
}
