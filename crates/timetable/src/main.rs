use std::sync::Arc;

use chrono::Utc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::auth::IdentityClient;
use crate::config::{resolve_config_path, Config};
use crate::db::TimetableDb;
use crate::types::AppState;

mod auth;
mod config;
mod db;
mod server;
mod types;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timetable=info,tower_http=info".into()),
        )
        .init();

    // config: first argument > TIMETABLE_CONFIG > ./config.json > defaults
    let config_path = resolve_config_path(std::env::args().nth(1));
    let config = Config::load(config_path.as_deref())?;

    info!(path = %config.database_path, "opening SQLite database");
    let db = TimetableDb::open(&config.database_path)?;
    let identity = IdentityClient::new(&config.identity)?;

    let state = Arc::new(AppState::new(&config, db, identity));
    spawn_session_pruner(state.clone(), config.prune_interval());

    let router = server::with_http_layers(server::create_router(state), &config.cors_origins);

    let listener = TcpListener::bind((config.address.as_str(), config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Periodically removes sessions whose expiry has passed.
fn spawn_session_pruner(state: Arc<AppState>, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match state.db.prune_expired_sessions(Utc::now()) {
                Ok(0) => {}
                Ok(n) => info!("Pruned {n} expired sessions"),
                Err(e) => error!("Failed to prune expired sessions: {e}"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
