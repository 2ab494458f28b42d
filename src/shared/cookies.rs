/// Name of the cookie carrying the anti-forgery token.
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";
/// Header the token is echoed back in on state-changing requests.
pub const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Looks up `name` in a `Cookie` header or `document.cookie` string.
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k.trim() == name).then(|| v.trim().trim_matches('"').to_string())
    })
}
