#![cfg(feature = "server")]
use std::env;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub github_client_id: String,
    pub github_client_secret: String,
    /// Origin the browser sees, used to build the OAuth2 redirect URI.
    pub public_base_url: String,
    pub cookie_secure: bool,
    pub session_ttl_days: i64,
    /// Signs every request in as this user, skipping GitHub.
    pub dev_user: Option<String>,
    pub bind_addr: Option<SocketAddr>,
}

pub fn resolve_db_url() -> String {
    use std::{fs, path::PathBuf};
    if let Ok(url) = env::var("DATABASE_URL") {
        return url;
    }
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("data");
    let _ = fs::create_dir_all(&path);
    path.push("data.db");
    // sqlx wants sqlite:///abs/path
    let path_str = path.to_string_lossy();
    let trimmed = path_str.strip_prefix('/').unwrap_or(&path_str);
    format!("sqlite:///{}?mode=rwc", trimmed)
}

fn flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok(), resolve_db_url())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>, database_url: String) -> Self {
        Self {
            database_url,
            github_client_id: get("GITHUB_CLIENT_ID").unwrap_or_default(),
            github_client_secret: get("GITHUB_CLIENT_SECRET").unwrap_or_default(),
            public_base_url: non_empty(get("PUBLIC_BASE_URL"))
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            cookie_secure: flag(get("COOKIE_SECURE")),
            session_ttl_days: get("SESSION_TTL_DAYS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|d: &i64| *d > 0)
                .unwrap_or(30),
            dev_user: non_empty(get("DEV_USER")),
            bind_addr: get("BIND_ADDR").and_then(|v| v.trim().parse().ok()),
        }
    }

    pub fn oauth_configured(&self) -> bool {
        !self.github_client_id.is_empty() && !self.github_client_secret.is_empty()
    }

    pub fn redirect_uri(&self) -> String {
        format!("{}/login/oauth2/code/github", self.public_base_url)
    }

    /// For tests and the CLI.
    pub fn for_database(database_url: &str) -> Self {
        Self::from_lookup(|_| None, database_url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned(), "sqlite::memory:".into())
    }

    #[test]
    fn defaults_without_environment() {
        let c = config(&[]);
        assert!(!c.oauth_configured());
        assert!(!c.cookie_secure);
        assert_eq!(c.session_ttl_days, 30);
        assert_eq!(c.redirect_uri(), "http://localhost:8080/login/oauth2/code/github");
        assert!(c.dev_user.is_none());
        assert!(c.bind_addr.is_none());
    }

    #[test]
    fn values_are_parsed() {
        let c = config(&[
            ("GITHUB_CLIENT_ID", "id"),
            ("GITHUB_CLIENT_SECRET", "secret"),
            ("PUBLIC_BASE_URL", "https://energy.example.org/"),
            ("COOKIE_SECURE", "TRUE"),
            ("SESSION_TTL_DAYS", "7"),
            ("DEV_USER", "  "),
            ("BIND_ADDR", "0.0.0.0:9000"),
        ]);
        assert!(c.oauth_configured());
        assert!(c.cookie_secure);
        assert_eq!(c.session_ttl_days, 7);
        assert_eq!(c.redirect_uri(), "https://energy.example.org/login/oauth2/code/github");
        assert!(c.dev_user.is_none());
        assert_eq!(c.bind_addr.map(|a| a.port()), Some(9000));
    }
}
