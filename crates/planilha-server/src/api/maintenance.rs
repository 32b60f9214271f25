use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use planilha_core::disallowed_terms;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::tenant;
use crate::error::AppError;
use crate::housekeeping::MaintenanceReport;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RemoveMatchingRequest {
    pub terms: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRowsRequest {
    pub rows: Vec<u32>,
}

async fn prune(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MaintenanceReport>, AppError> {
    let tenant = tenant(&name)?;
    let report = state
        .store
        .prune_empty_rows(tenant, &CancellationToken::new())
        .await?;
    Ok(Json(report))
}

async fn renumber(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MaintenanceReport>, AppError> {
    let tenant = tenant(&name)?;
    let report = state
        .store
        .renumber_rows(tenant, &CancellationToken::new())
        .await?;
    Ok(Json(report))
}

/// Remove rows where any cell contains one of the terms, ignoring case
async fn remove_matching(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<RemoveMatchingRequest>,
) -> Result<Json<MaintenanceReport>, AppError> {
    let tenant = tenant(&name)?;
    if req.terms.iter().all(|t| t.trim().is_empty()) {
        return Err(AppError::Validation("at least one non-blank term is required".to_string()));
    }
    let report = state
        .store
        .remove_rows_matching(tenant, disallowed_terms(&req.terms), &CancellationToken::new())
        .await?;
    Ok(Json(report))
}

async fn remove_rows(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<RemoveRowsRequest>,
) -> Result<Json<MaintenanceReport>, AppError> {
    let tenant = tenant(&name)?;
    let report = state
        .store
        .remove_row_indices(tenant, &req.rows, &CancellationToken::new())
        .await?;
    Ok(Json(report))
}

/// Prune and renumber every tenant
async fn tidy_all(State(state): State<AppState>) -> Json<Vec<MaintenanceReport>> {
    Json(state.store.tidy_all(&CancellationToken::new()).await)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tenants/{tenant}/maintenance/prune", post(prune))
        .route("/api/tenants/{tenant}/maintenance/renumber", post(renumber))
        .route(
            "/api/tenants/{tenant}/maintenance/remove-matching",
            post(remove_matching),
        )
        .route("/api/tenants/{tenant}/maintenance/remove-rows", post(remove_rows))
        .route("/api/maintenance/tidy", post(tidy_all))
}
