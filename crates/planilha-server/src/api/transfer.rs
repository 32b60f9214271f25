use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::tenant;
use crate::error::AppError;
use crate::import::{ImportSummary, RecordImportSummary, SheetOutcome};
use crate::AppState;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Deserialize)]
pub struct WorkbookQuery {
    #[serde(default = "default_labels")]
    pub labels: bool,
}

fn default_labels() -> bool {
    true
}

/// Replace a tenant's dataset with JSON rows
async fn import_tabular(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(rows): Json<Vec<Vec<String>>>,
) -> Result<Json<ImportSummary>, AppError> {
    let tenant = tenant(&name)?;
    Ok(Json(state.store.import_tabular(tenant, &rows).await?))
}

/// Replace a tenant's dataset with a headerless CSV body
async fn import_csv(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ImportSummary>, AppError> {
    let tenant = tenant(&name)?;
    Ok(Json(state.store.import_tabular_csv(tenant, &body).await?))
}

/// Upsert `linha,coluna,valor` records from a CSV body
async fn import_records(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<RecordImportSummary>, AppError> {
    let tenant = tenant(&name)?;
    Ok(Json(state.store.import_records_csv(tenant, &body).await?))
}

/// Import every tenant sheet of an uploaded workbook
async fn import_workbook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<SheetOutcome>>, AppError> {
    Ok(Json(state.store.import_workbook(body.to_vec()).await?))
}

async fn matrix(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Vec<String>>>, AppError> {
    let tenant = tenant(&name)?;
    Ok(Json(state.store.compose_matrix(tenant).await?))
}

async fn export_csv(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let tenant = tenant(&name)?;
    let body = state.store.export_records_csv(tenant).await?;
    Ok(attachment("text/csv; charset=utf-8", &format!("{tenant}.csv"), body))
}

async fn export_workbook(
    State(state): State<AppState>,
    Query(query): Query<WorkbookQuery>,
) -> Result<Response, AppError> {
    let body = state
        .store
        .export_workbook(query.labels, &CancellationToken::new())
        .await?;
    Ok(attachment(XLSX_CONTENT_TYPE, "escolas-municipais.xlsx", body))
}

fn attachment(content_type: &'static str, filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tenants/{tenant}/import/tabular", post(import_tabular))
        .route("/api/tenants/{tenant}/import/csv", post(import_csv))
        .route("/api/tenants/{tenant}/import/records", post(import_records))
        .route("/api/import/workbook", post(import_workbook))
        .route("/api/tenants/{tenant}/matrix", get(matrix))
        .route("/api/tenants/{tenant}/export/csv", get(export_csv))
        .route("/api/export/workbook", get(export_workbook))
}
