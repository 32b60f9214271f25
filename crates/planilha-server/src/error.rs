use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use planilha_core::GridError;
use serde_json::json;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Underlying persistence failure; aborts the current operation
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown tenant: {0}")]
    UnknownTenant(String),

    #[error("Import format error: {0}")]
    ImportFormat(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<GridError> for AppError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::Validation(msg) => AppError::Validation(msg),
            GridError::UnknownTenant(name) => AppError::UnknownTenant(name),
            GridError::ImportFormat(msg) => AppError::ImportFormat(msg),
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(_) => AppError::Internal(format!("csv io: {err}")),
            _ => AppError::ImportFormat(format!("csv: {err}")),
        }
    }
}

impl From<calamine::Error> for AppError {
    fn from(err: calamine::Error) -> Self {
        AppError::ImportFormat(format!("workbook: {err}"))
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Internal(format!("xlsx writer: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Migrate(e) => {
                tracing::error!("Migration error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Validation(msg) | AppError::ImportFormat(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::UnknownTenant(name) => {
                (StatusCode::NOT_FOUND, format!("Unknown tenant: {name}"))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Cancelled => (StatusCode::CONFLICT, "Operation cancelled".to_string()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                (StatusCode::BAD_REQUEST, "Invalid JSON".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
