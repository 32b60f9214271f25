use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GridError;

/// Cell coordinate (0-indexed, row 0 is a data row)
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// Rows a grid may address; one worksheet's row limit, so every tenant
    /// fits a sheet of the combined workbook export
    pub const MAX_ROWS: u32 = 1_048_576;
    /// Columns a grid may address; one worksheet's column limit
    pub const MAX_COLS: u32 = 16_384;

    pub const fn new(row: u32, col: u32) -> Self {
        CellCoord { row, col }
    }

    /// Validate coordinates arriving from outside (JSON numbers, CSV fields).
    /// Both must be non-negative and below [`Self::MAX_ROWS`] / [`Self::MAX_COLS`].
    pub fn try_new(row: i64, col: i64) -> Result<Self, GridError> {
        let row = u32::try_from(row)
            .ok()
            .filter(|r| *r < Self::MAX_ROWS)
            .ok_or_else(|| GridError::Validation(format!("invalid row index: {row}")))?;
        let col = u32::try_from(col)
            .ok()
            .filter(|c| *c < Self::MAX_COLS)
            .ok_or_else(|| GridError::Validation(format!("invalid column index: {col}")))?;
        Ok(CellCoord { row, col })
    }

    /// Convert to A1 notation (e.g., (0, 0) -> "A1")
    pub fn to_a1(&self) -> String {
        format!("{}{}", col_to_label(self.col), self.row + 1)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

/// Convert column index (0-indexed) to label (A, B, ..., Z, AA, AB, ...)
pub fn col_to_label(col: u32) -> String {
    let mut label = String::new();
    let mut n = col + 1;

    while n > 0 {
        n -= 1;
        label.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }

    label
}
