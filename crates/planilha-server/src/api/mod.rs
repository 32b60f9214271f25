mod health;
mod maintenance;
mod tenants;
mod transfer;

use axum::Router;
use planilha_core::Tenant;

use crate::error::AppError;
use crate::AppState;

/// Create the API router
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(tenants::router())
        .merge(transfer::router())
        .merge(maintenance::router())
}

/// Resolve a tenant named in a request path
fn tenant(name: &str) -> Result<Tenant, AppError> {
    Ok(Tenant::parse(name)?)
}
