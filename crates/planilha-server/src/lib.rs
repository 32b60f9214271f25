pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod formats;
pub mod housekeeping;
pub mod import;
pub mod locks;
pub mod store;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;

pub use crate::config::StoreOptions;
pub use crate::error::{AppError, AppResult};
pub use crate::export::{MultiTenantExport, TenantMatrix};
pub use crate::housekeeping::{MaintenanceReport, RowFailure};
pub use crate::import::{ImportSummary, RecordImportSummary, SheetOutcome};
pub use crate::store::{GridStore, PutOutcome};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: GridStore,
}

/// Build the HTTP router around a store
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .merge(api::router())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the server with the given configuration
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let db = Database::connect(&config.database_url, config.max_connections).await?;
    db.migrate().await?;

    let store = GridStore::new(db.clone(), config.store);
    let app = build_router(AppState { store }, config.max_upload_bytes);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
