// Copyright 2025 lalog contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! lalog Server
//!
//! The collector: accepts per-host load-average samples over HTTP,
//! persists them in SQLite, and serves time-range queries.

pub mod api;
pub mod config;
pub mod validation;

use anyhow::Result;
use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{health_check, host_samples, ingest_sample, list_hosts, reject_post_root, AppState};
use config::ServerConfig;
use lalog_storage::SqliteStore;

/// Builds the collector router. Split out of [`run_server`] so tests can
/// drive it without binding a socket.
pub fn app(state: AppState, enable_cors: bool) -> Router {
    let mut router = Router::new()
        .route("/", get(list_hosts).post(reject_post_root))
        .route("/healthz", get(health_check))
        .route("/:hostname", get(host_samples).post(ingest_sample))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lalog_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting lalog collector");
    config.validate()?;

    // Schema bootstrap failure here is fatal: the process exits nonzero.
    tracing::info!("Opening datastore at: {:?}", config.storage.db_path);
    let store = SqliteStore::open(&config.storage.db_path)?;

    let state = AppState { store };
    let router = app(state, config.server.enable_cors);

    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr).await?;
    tracing::info!("Listening on {}", config.server.listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Collector shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install ctrl-c handler: {e}");
    }
}
