use thiserror::Error;

/// Errors raised by the grid domain before anything touches storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Malformed row/column or malformed import shape
    #[error("Validation error: {0}")]
    Validation(String),

    /// Identifier that does not name a registered tenant
    #[error("Unknown tenant: {0}")]
    UnknownTenant(String),

    /// Empty or unparseable bulk source
    #[error("Import format error: {0}")]
    ImportFormat(String),
}

pub type GridResult<T> = Result<T, GridError>;
