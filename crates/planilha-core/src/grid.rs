use std::collections::BTreeMap;

use crate::cell::{Cell, CellRecord};
use crate::dimensions::GridDimensions;
use crate::range::CellCoord;

/// In-memory sparse view of one tenant's cells, keyed row-major.
///
/// Built from a storage snapshot; used to compose dense exports and to plan
/// housekeeping without issuing a query per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseGrid {
    rows: BTreeMap<u32, BTreeMap<u32, String>>,
}

/// Borrowed view of a single row handed to row predicates
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    pub row: u32,
    cells: &'a BTreeMap<u32, String>,
}

impl<'a> RowView<'a> {
    /// Stored values in column order
    pub fn values(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.cells.values().map(String::as_str)
    }

    /// True when every stored cell is blank after trimming
    pub fn is_blank(&self) -> bool {
        self.values().all(|v| v.trim().is_empty())
    }
}

impl SparseGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        let mut grid = SparseGrid::new();
        for cell in cells {
            grid.insert(cell.coord(), cell.value.clone());
        }
        grid
    }

    /// Set a value, overwriting whatever was at `coord`
    pub fn insert(&mut self, coord: CellCoord, value: impl Into<String>) {
        self.rows
            .entry(coord.row)
            .or_default()
            .insert(coord.col, value.into());
    }

    pub fn cell_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// Distinct row indices holding at least one cell, ascending
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(|(row, cells)| RowView { row: *row, cells })
    }

    /// Smallest rectangle anchored at (0, 0) containing every stored cell
    pub fn extent(&self) -> GridDimensions {
        // Saturates at the index range; stored coordinates stay below
        // CellCoord::MAX_ROWS / MAX_COLS.
        let rows = self.rows.keys().next_back().map_or(0, |r| r.saturating_add(1));
        let cols = self
            .rows
            .values()
            .filter_map(|row| row.keys().next_back())
            .max()
            .map_or(0, |c| c.saturating_add(1));
        GridDimensions::new(rows, cols)
    }

    /// Dense matrix at least `configured` in size and large enough for every
    /// stored cell; unset positions are empty strings
    pub fn to_dense(&self, configured: GridDimensions) -> Vec<Vec<String>> {
        let size = configured.union(self.extent());
        let mut matrix = vec![vec![String::new(); size.cols as usize]; size.rows as usize];
        for (row, cells) in &self.rows {
            for (col, value) in cells {
                matrix[*row as usize][*col as usize] = value.clone();
            }
        }
        matrix
    }

    /// Flat records sorted by row then column
    pub fn records(&self) -> Vec<CellRecord> {
        self.rows
            .iter()
            .flat_map(|(row, cells)| {
                cells.iter().map(move |(col, value)| CellRecord {
                    row: *row,
                    col: *col,
                    value: value.clone(),
                })
            })
            .collect()
    }

    /// Rows whose stored cells are all blank
    pub fn blank_rows(&self) -> Vec<u32> {
        self.rows_matching(|row| row.is_blank())
    }

    pub fn rows_matching<F>(&self, predicate: F) -> Vec<u32>
    where
        F: Fn(&RowView<'_>) -> bool,
    {
        self.rows().filter(|row| predicate(row)).map(|row| row.row).collect()
    }

    /// Moves `(from, to)` that compact the occupied rows onto `0..k`.
    ///
    /// Returned in ascending order. Applying them in that order never targets
    /// an occupied row because every target is at most its source and all
    /// lower rows have already been placed.
    pub fn renumber_plan(&self) -> Vec<(u32, u32)> {
        self.rows
            .keys()
            .zip(0u32..)
            .filter(|(from, to)| **from != *to)
            .map(|(from, to)| (*from, to))
            .collect()
    }
}

/// Build a predicate matching rows where any cell contains any of `terms`,
/// case-insensitively
pub fn disallowed_terms<S: AsRef<str>>(terms: &[S]) -> impl Fn(&RowView<'_>) -> bool {
    let terms: Vec<String> = terms
        .iter()
        .map(|t| t.as_ref().trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();
    move |row: &RowView<'_>| {
        row.values().any(|value| {
            let value = value.to_uppercase();
            terms.iter().any(|term| value.contains(term.as_str()))
        })
    }
}
