use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{classify, TypeTag};
use crate::range::CellCoord;

/// A stored cell. Its `kind` is always the classification of `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: TypeTag,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Cell {
    pub fn coord(&self) -> CellCoord {
        CellCoord::new(self.row, self.col)
    }

    /// Whether the value is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// A value about to be written, already classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub coord: CellCoord,
    pub value: String,
    pub kind: TypeTag,
}

impl CellWrite {
    pub fn new(coord: CellCoord, value: impl Into<String>) -> Self {
        let value = value.into();
        let kind = classify(&value);
        CellWrite { coord, value, kind }
    }
}

/// One `(row, column, value)` entry of a flat delimited export or import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub row: u32,
    pub col: u32,
    pub value: String,
}

/// A delimited import record; missing coordinates mean the record is skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimitedRecord {
    pub row: Option<i64>,
    #[serde(alias = "column")]
    pub col: Option<i64>,
    #[serde(default)]
    pub value: Option<String>,
}
