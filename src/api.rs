//! Client side of the REST API. Every call is a plain browser fetch; outside
//! the browser (server render) calls fail with [`FetchError::Unavailable`].

use dioxus::logger::tracing::{error, info};

use crate::shared::descriptor::ViewDescriptor;
use crate::shared::rows::{parse_rows, Row};
use crate::shared::types::{AuthState, EnergyReadingDto, SpendingRangeDto};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },
    #[error("not running in a browser")]
    #[allow(dead_code)]
    Unavailable,
}

#[cfg(feature = "web")]
impl From<gloo_net::Error> for FetchError {
    fn from(e: gloo_net::Error) -> Self {
        FetchError::Network(e.to_string())
    }
}

#[cfg(feature = "web")]
fn check(url: &str, resp: gloo_net::http::Response) -> Result<gloo_net::http::Response, FetchError> {
    if resp.ok() {
        Ok(resp)
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status: resp.status(),
        })
    }
}

/// GET `url` and return the body text of a 2xx response.
pub async fn get_text(url: &str) -> Result<String, FetchError> {
    #[cfg(feature = "web")]
    {
        let resp = gloo_net::http::Request::get(url).send().await?;
        Ok(check(url, resp)?.text().await?)
    }
    #[cfg(not(feature = "web"))]
    {
        let _ = url;
        Err(FetchError::Unavailable)
    }
}

/// POST `body` as JSON with the anti-forgery header.
pub async fn post_json<T: serde::Serialize>(url: &str, body: Option<&T>) -> Result<(), FetchError> {
    #[cfg(feature = "web")]
    {
        use crate::shared::cookies::XSRF_HEADER;
        use gloo_net::http::Request;

        let token = crate::utils::browser::xsrf_token().unwrap_or_default();
        let builder = Request::post(url).header(XSRF_HEADER, &token);
        let resp = match body {
            Some(b) => builder.json(b)?.send().await?,
            None => builder.send().await?,
        };
        check(url, resp)?;
        Ok(())
    }
    #[cfg(not(feature = "web"))]
    {
        let _ = (url, body);
        Err(FetchError::Unavailable)
    }
}

pub async fn probe_user() -> AuthState {
    AuthState::from_probe(get_text("/api/user").await)
}

/// Ends the session. The outcome is only logged; callers re-probe afterwards.
pub async fn logout() {
    match post_json::<()>("/logout", None).await {
        Ok(()) => info!("[auth] logged out"),
        Err(e) => info!("[auth] logout request ended with: {e}"),
    }
}

/// Rows for one view. Any failure is logged and yields no rows.
pub async fn fetch_rows(descriptor: &ViewDescriptor) -> Vec<Row> {
    let body = match get_text(descriptor.url).await {
        Ok(b) => b,
        Err(e) => {
            error!("[{}] fetch {} failed: {e}", descriptor.title, descriptor.url);
            return vec![];
        }
    };
    match parse_rows(&body, descriptor) {
        Ok(rows) => rows,
        Err(e) => {
            error!("[{}] bad response from {}: {e}", descriptor.title, descriptor.url);
            vec![]
        }
    }
}

pub async fn add_reading(reading: &EnergyReadingDto) -> Result<(), FetchError> {
    post_json("/api/reading/add", Some(reading)).await
}

pub async fn last_reading() -> Option<EnergyReadingDto> {
    let body = get_text("/api/reading/last").await.ok()?;
    serde_json::from_str(&body).ok()
}

pub async fn total_spending() -> Option<SpendingRangeDto> {
    let body = get_text("/api/spending/all").await.ok()?;
    serde_json::from_str(&body).ok()
}
