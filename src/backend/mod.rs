#![cfg(feature = "server")]

pub mod auth;
pub mod calculator;
pub mod config;
pub mod convert;
pub mod db;
pub mod error;
pub mod importer;
pub mod routes;
pub mod seed;
pub mod spending;

pub use config::Config;
pub use db::Db;

use std::net::SocketAddr;
use std::sync::Arc;

use dioxus::logger::tracing::{info, warn};
pub use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt, EnvFilter};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Db>,
    pub config: Arc<Config>,
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,sqlx::query=off,sqlx::query::describe=off,tower_http=info")
    });
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

pub async fn open_db(config: &Config) -> anyhow::Result<Arc<Db>> {
    let db = Db::connect(&config.database_url).await?;
    info!("[db] initialized");
    Ok(Arc::new(db))
}

/// REST API plus the server-rendered dashboard on one listener.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    use dioxus::prelude::{DioxusRouterExt, ServeConfigBuilder};

    match state.db.prune_sessions().await {
        Ok(n) if n > 0 => info!("[auth] pruned {n} expired sessions"),
        Ok(_) => {}
        Err(e) => warn!("[auth] session pruning failed: {e}"),
    }
    if state.config.dev_user.is_some() {
        warn!("[auth] DEV_USER is set; every request is signed in without GitHub");
    }

    let addr: SocketAddr = state
        .config
        .bind_addr
        .unwrap_or_else(dioxus::cli_config::fullstack_address_or_localhost);

    let router = routes::build_router(state)
        .serve_dioxus_application(ServeConfigBuilder::new(), crate::app::App);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
