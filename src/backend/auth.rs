#![cfg(feature = "server")]
//! GitHub sign-in, cookie sessions and the anti-forgery check.
//!
//! A session is a random id in the HttpOnly `SESSION` cookie pointing at a
//! row in SQLite. Each session also owns a CSRF token, handed to the page in
//! the script-readable `XSRF-TOKEN` cookie; every POST must echo it in the
//! `X-XSRF-TOKEN` header.

use anyhow::{anyhow, Context, Result};
use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap,
    },
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Duration;
use dioxus::logger::tracing::{info, warn};
use once_cell::sync::Lazy;
use rand::RngCore;
use reqwest::Client;
use serde::Deserialize;

use crate::backend::config::Config;
use crate::backend::db::UserRow;
use crate::backend::error::{ApiError, ApiResult};
use crate::backend::AppState;
use crate::shared::cookies::{cookie_value, XSRF_COOKIE, XSRF_HEADER};

pub const SESSION_COOKIE: &str = "SESSION";
const STATE_COOKIE: &str = "OAUTH_STATE";

const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_URL: &str = "https://api.github.com/user";

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .connect_timeout(std::time::Duration::from_secs(5))
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
});

/// 32 random bytes, URL-safe base64.
pub fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn request_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| cookie_value(v, name))
        .filter(|v| !v.is_empty())
}

pub fn set_cookie(
    config: &Config,
    name: &str,
    value: &str,
    max_age_secs: i64,
    http_only: bool,
) -> String {
    let mut c = format!("{name}={value}; Path=/; Max-Age={max_age_secs}; SameSite=Lax");
    if http_only {
        c.push_str("; HttpOnly");
    }
    if config.cookie_secure {
        c.push_str("; Secure");
    }
    c
}

fn clear_cookie(config: &Config, name: &str, http_only: bool) -> String {
    set_cookie(config, name, "", 0, http_only)
}

/// The signed-in user behind a request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: UserRow,
    pub session_id: Option<String>,
    /// The token POSTs must carry; `None` means the `XSRF-TOKEN` cookie
    /// itself is the reference (development sign-in).
    pub csrf_token: Option<String>,
}

impl CurrentUser {
    /// Rejects state-changing requests whose header does not match.
    pub fn verify_csrf(&self, headers: &HeaderMap) -> ApiResult<()> {
        let expected = match &self.csrf_token {
            Some(t) => Some(t.clone()),
            None => request_cookie(headers, XSRF_COOKIE),
        };
        let sent = headers.get(XSRF_HEADER).and_then(|v| v.to_str().ok());
        match (expected, sent) {
            (Some(expected), Some(sent)) if !sent.is_empty() && sent == expected => Ok(()),
            _ => Err(ApiError::Forbidden),
        }
    }
}

pub async fn current_user(state: &AppState, headers: &HeaderMap) -> ApiResult<Option<CurrentUser>> {
    if let Some(dev) = &state.config.dev_user {
        let user = match state.db.get_user_by_name(dev).await? {
            Some(user) => user,
            None => state.db.upsert_user(dev, dev).await?,
        };
        return Ok(Some(CurrentUser {
            user,
            session_id: None,
            csrf_token: None,
        }));
    }
    let Some(id) = request_cookie(headers, SESSION_COOKIE) else {
        return Ok(None);
    };
    Ok(state.db.session(&id).await?.map(|s| CurrentUser {
        user: s.user,
        session_id: Some(id),
        csrf_token: Some(s.csrf_token),
    }))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ApiResult<Self> {
        current_user(state, &parts.headers)
            .await?
            .ok_or(ApiError::Unauthorized)
    }
}

pub fn authorize_url(config: &Config, state: &str) -> String {
    format!(
        "{GITHUB_AUTHORIZE_URL}?client_id={}&redirect_uri={}&scope=read%3Auser&state={}",
        urlencoding::encode(&config.github_client_id),
        urlencoding::encode(&config.redirect_uri()),
        urlencoding::encode(state),
    )
}

/// `/api/private`: sends anonymous visitors to GitHub, everyone else home.
pub async fn login(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    if current_user(&state, &headers).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    if !state.config.oauth_configured() {
        warn!("[auth] GITHUB_CLIENT_ID/GITHUB_CLIENT_SECRET not set; sign-in unavailable");
        return Err(ApiError::NotFound("GitHub sign-in is not configured".into()));
    }
    let oauth_state = random_token();
    let cookie = set_cookie(&state.config, STATE_COOKIE, &oauth_state, 600, true);
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Redirect::to(&authorize_url(&state.config, &oauth_state)),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
    name: Option<String>,
}

async fn exchange_code(config: &Config, code: &str) -> Result<GithubUser> {
    let token: TokenResponse = CLIENT
        .post(GITHUB_TOKEN_URL)
        .header("Accept", "application/json")
        .form(&[
            ("client_id", config.github_client_id.as_str()),
            ("client_secret", config.github_client_secret.as_str()),
            ("code", code),
            ("redirect_uri", config.redirect_uri().as_str()),
        ])
        .send()
        .await
        .context("requesting GitHub access token")?
        .error_for_status()?
        .json()
        .await
        .context("decoding GitHub token response")?;
    let access_token = token.access_token.ok_or_else(|| {
        anyhow!(
            "GitHub refused the code: {}",
            token.error_description.unwrap_or_default()
        )
    })?;

    let user = CLIENT
        .get(GITHUB_USER_URL)
        .bearer_auth(access_token)
        .header("Accept", "application/vnd.github+json")
        .send()
        .await
        .context("requesting GitHub user")?
        .error_for_status()?
        .json()
        .await
        .context("decoding GitHub user")?;
    Ok(user)
}

/// `/login/oauth2/code/github`: finishes sign-in and opens a session.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Response> {
    if let Some(e) = query.error {
        warn!("[auth] GitHub returned error {e}");
        return Ok(Redirect::to("/").into_response());
    }
    let expected = request_cookie(&headers, STATE_COOKIE);
    let (Some(code), Some(returned)) = (query.code, query.state) else {
        return Err(ApiError::BadRequest("missing code or state".into()));
    };
    if expected.as_deref() != Some(returned.as_str()) {
        return Err(ApiError::BadRequest("sign-in state mismatch".into()));
    }

    let gh = exchange_code(&state.config, &code).await?;
    let full_name = gh.name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| gh.login.clone());
    let user = state.db.upsert_user(&gh.login, &full_name).await?;

    let session_id = random_token();
    let csrf = random_token();
    let ttl = Duration::days(state.config.session_ttl_days);
    state
        .db
        .create_session(&session_id, user.id, &csrf, ttl)
        .await?;
    info!("[auth] {} signed in", user.user_name);

    let cfg = &state.config;
    let max_age = ttl.num_seconds();
    Ok((
        AppendHeaders([
            (SET_COOKIE, set_cookie(cfg, SESSION_COOKIE, &session_id, max_age, true)),
            (SET_COOKIE, set_cookie(cfg, XSRF_COOKIE, &csrf, max_age, false)),
            (SET_COOKIE, clear_cookie(cfg, STATE_COOKIE, true)),
        ]),
        Redirect::to("/"),
    )
        .into_response())
}

/// `POST /logout`.
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
) -> ApiResult<Response> {
    user.verify_csrf(&headers)?;
    if let Some(id) = &user.session_id {
        state.db.delete_session(id).await?;
    }
    info!("[auth] {} signed out", user.user.user_name);
    let cfg = &state.config;
    Ok((
        AppendHeaders([
            (SET_COOKIE, clear_cookie(cfg, SESSION_COOKIE, true)),
            (SET_COOKIE, clear_cookie(cfg, XSRF_COOKIE, false)),
        ]),
        Redirect::to("/"),
    )
        .into_response())
}

/// Makes sure a development sign-in has an `XSRF-TOKEN` cookie to echo.
pub fn dev_xsrf_cookie(config: &Config, headers: &HeaderMap) -> Option<String> {
    if config.dev_user.is_none() || request_cookie(headers, XSRF_COOKIE).is_some() {
        return None;
    }
    Some(set_cookie(config, XSRF_COOKIE, &random_token(), 86_400, false))
}
