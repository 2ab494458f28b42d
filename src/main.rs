use dioxus::prelude::*;

mod api;
mod app;
mod components;
mod shared;
mod utils;

#[cfg(feature = "server")]
mod backend;

pub const MAIN_CSS: Asset = asset!("/assets/main.css");

#[cfg(feature = "server")]
fn main() {
    use backend::{AppState, Config};
    use dioxus::logger::tracing::error;
    use std::sync::Arc;

    dotenvy::dotenv().ok();
    backend::init_tracing();
    let config = Arc::new(Config::from_env());

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    let mut args = std::env::args().skip(1);
    let cmd = args.next();
    let result: anyhow::Result<()> = rt.block_on(async move {
        let db = backend::open_db(&config).await?;
        match cmd.as_deref() {
            Some("gen-test-data") => {
                let days = args.next().and_then(|s| s.parse().ok()).unwrap_or(180);
                backend::seed::generate_test_data(db, days).await?;
            }
            Some("import-csv") => {
                let (Some(file), Some(user)) = (args.next(), args.next()) else {
                    anyhow::bail!("usage: import-csv <file> <user>");
                };
                backend::importer::import_csv(db, std::path::Path::new(&file), &user).await?;
            }
            Some(other) if !other.starts_with('-') => {
                anyhow::bail!("unknown command '{other}' (expected import-csv or gen-test-data)");
            }
            _ => backend::serve(AppState { db, config }).await?,
        }
        Ok(())
    });

    if let Err(e) = result {
        error!("{e:#}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "server"))]
fn main() {
    dioxus::launch(app::App);
}
