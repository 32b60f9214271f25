use chrono::{DateTime, Utc};
use planilha_core::{classify, Cell, Tenant, TypeTag};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Cell table row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CellRow {
    pub row_idx: i64,
    pub col_idx: i64,
    pub value: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl TryFrom<CellRow> for Cell {
    type Error = AppError;

    fn try_from(row: CellRow) -> Result<Self, Self::Error> {
        // Rows written before tagging existed carry no usable tag.
        let kind = row
            .kind
            .parse::<TypeTag>()
            .unwrap_or_else(|_| classify(&row.value));
        Ok(Cell {
            row: index(row.row_idx, "row")?,
            col: index(row.col_idx, "column")?,
            value: row.value,
            kind,
            created_at: row.created_at,
            modified_at: row.modified_at,
        })
    }
}

/// One audit-log entry capturing a single write's before/after value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChangeRecord {
    pub id: i64,
    pub tenant: String,
    pub row_idx: i64,
    pub col_idx: i64,
    pub previous_value: String,
    pub new_value: String,
    pub recorded_at: DateTime<Utc>,
}

/// Grid configuration table row
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct ConfigRow {
    pub row_count: i64,
    pub col_count: i64,
}

/// Aggregate counters for one tenant's stored cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantStats {
    pub tenant: Tenant,
    pub rows: u64,
    pub first_row: Option<u32>,
    pub last_row: Option<u32>,
    pub cells: u64,
    pub filled_cells: u64,
}

#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct StatsRow {
    pub row_total: i64,
    pub first_row: Option<i64>,
    pub last_row: Option<i64>,
    pub cell_total: i64,
    pub filled_cells: i64,
}

pub(crate) fn index(raw: i64, what: &str) -> Result<u32, AppError> {
    u32::try_from(raw).map_err(|_| AppError::Internal(format!("stored {what} index out of range: {raw}")))
}
