use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use planilha_core::{Cell, GridDimensions, TypeTag, REGISTRY};
use serde::{Deserialize, Serialize};

use super::tenant;
use crate::db::models::{ChangeRecord, TenantStats};
use crate::error::AppError;
use crate::store::PutOutcome;
use crate::AppState;

/// Interactive resize limits; the store itself allows a full worksheet
const MAX_ROWS: i64 = 100;
const MAX_COLS: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct CellQuery {
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CellResponse {
    pub row: u32,
    pub col: u32,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: TypeTag,
}

impl From<Cell> for CellResponse {
    fn from(cell: Cell) -> Self {
        Self {
            row: cell.row,
            col: cell.col,
            value: cell.value,
            kind: cell.kind,
        }
    }
}

/// Request to write one cell
#[derive(Debug, Deserialize)]
pub struct PutCellRequest {
    pub row: i64,
    #[serde(alias = "column")]
    pub col: i64,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfigRequest {
    pub rows: i64,
    pub cols: i64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

async fn list_tenants() -> Json<Vec<&'static str>> {
    Json(REGISTRY.to_vec())
}

/// List a tenant's cells, optionally filtered by substring
async fn list_cells(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<CellQuery>,
) -> Result<Json<Vec<CellResponse>>, AppError> {
    let tenant = tenant(&name)?;
    let filter = query.filter.as_deref().filter(|f| !f.is_empty());
    let cells = state.store.list_cells(tenant, filter).await?;
    Ok(Json(cells.into_iter().map(Into::into).collect()))
}

/// Write one cell
async fn put_cell(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<PutCellRequest>,
) -> Result<Json<PutOutcome>, AppError> {
    let tenant = tenant(&name)?;
    let outcome = state
        .store
        .put_cell(tenant, req.row, req.col, &req.value)
        .await?;
    Ok(Json(outcome))
}

/// Delete every cell of a tenant
async fn clear_cells(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tenant = tenant(&name)?;
    let removed = state.store.clear_tenant(tenant).await?;
    Ok(Json(serde_json::json!({ "cleared": removed })))
}

async fn get_cell(
    State(state): State<AppState>,
    Path((name, row, col)): Path<(String, i64, i64)>,
) -> Result<Json<Cell>, AppError> {
    let tenant = tenant(&name)?;
    let cell = state
        .store
        .get_cell(tenant, row, col)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No cell at ({row}, {col}) for {tenant}")))?;
    Ok(Json(cell))
}

async fn get_config(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<GridDimensions>, AppError> {
    let tenant = tenant(&name)?;
    Ok(Json(state.store.get_config(tenant).await?))
}

/// Resize a tenant's grid within the interactive limits
async fn set_config(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<ConfigRequest>,
) -> Result<Json<GridDimensions>, AppError> {
    let tenant = tenant(&name)?;
    if !(1..=MAX_ROWS).contains(&req.rows) || !(1..=MAX_COLS).contains(&req.cols) {
        return Err(AppError::Validation(format!(
            "grid must be 1-{MAX_ROWS} rows and 1-{MAX_COLS} columns"
        )));
    }
    let dimensions = state.store.set_config(tenant, req.rows, req.cols).await?;
    Ok(Json(dimensions))
}

async fn recent_history(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChangeRecord>>, AppError> {
    let tenant = tenant(&name)?;
    Ok(Json(state.store.recent_history(tenant, query.limit).await?))
}

async fn stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<TenantStats>, AppError> {
    let tenant = tenant(&name)?;
    Ok(Json(state.store.tenant_stats(tenant).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tenants", get(list_tenants))
        .route(
            "/api/tenants/{tenant}/cells",
            get(list_cells).post(put_cell).delete(clear_cells),
        )
        .route("/api/tenants/{tenant}/cells/{row}/{col}", get(get_cell))
        .route(
            "/api/tenants/{tenant}/config",
            get(get_config).put(set_config),
        )
        .route("/api/tenants/{tenant}/history", get(recent_history))
        .route("/api/tenants/{tenant}/stats", get(stats))
}
