use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::range::CellCoord;

/// Logical size of a tenant's grid.
///
/// This is a rendering and import hint. Cells outside the rectangle are legal
/// and remain retrievable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub rows: u32,
    pub cols: u32,
}

impl GridDimensions {
    pub const DEFAULT_ROWS: u32 = 20;
    pub const DEFAULT_COLS: u32 = 8;

    pub const fn new(rows: u32, cols: u32) -> Self {
        GridDimensions { rows, cols }
    }

    /// Validate dimensions arriving from outside; at most
    /// [`CellCoord::MAX_ROWS`] by [`CellCoord::MAX_COLS`]
    pub fn try_new(rows: i64, cols: i64) -> Result<Self, GridError> {
        let rows = u32::try_from(rows)
            .ok()
            .filter(|r| *r <= CellCoord::MAX_ROWS)
            .ok_or_else(|| GridError::Validation(format!("invalid row count: {rows}")))?;
        let cols = u32::try_from(cols)
            .ok()
            .filter(|c| *c <= CellCoord::MAX_COLS)
            .ok_or_else(|| GridError::Validation(format!("invalid column count: {cols}")))?;
        Ok(GridDimensions { rows, cols })
    }

    /// Component-wise maximum
    pub fn union(self, other: GridDimensions) -> Self {
        GridDimensions {
            rows: self.rows.max(other.rows),
            cols: self.cols.max(other.cols),
        }
    }
}

impl Default for GridDimensions {
    fn default() -> Self {
        GridDimensions::new(Self::DEFAULT_ROWS, Self::DEFAULT_COLS)
    }
}
