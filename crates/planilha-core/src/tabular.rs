use crate::cell::CellWrite;
use crate::dimensions::GridDimensions;
use crate::error::GridError;
use crate::range::CellCoord;

/// A tabular source normalized into a complete generation of cell writes
#[derive(Debug, Clone, PartialEq)]
pub struct TabularGeneration {
    pub writes: Vec<CellWrite>,
    pub dimensions: GridDimensions,
}

/// Pad ragged rows to the widest row and classify every position.
///
/// Source row `i` becomes grid row `i`; nothing is treated as a header.
/// Values are trimmed before they are classified and stored.
pub fn prepare_tabular<R, S>(rows: &[R]) -> Result<TabularGeneration, GridError>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    if rows.is_empty() {
        return Err(GridError::ImportFormat("tabular source has no rows".to_string()));
    }

    let width = rows
        .iter()
        .map(|r| AsRef::<[S]>::as_ref(r).len())
        .max()
        .unwrap_or(0);
    let row_count = u32::try_from(rows.len())
        .ok()
        .filter(|r| *r <= CellCoord::MAX_ROWS)
        .ok_or_else(|| GridError::Validation(format!("too many rows: {}", rows.len())))?;
    let col_count = u32::try_from(width)
        .ok()
        .filter(|c| *c <= CellCoord::MAX_COLS)
        .ok_or_else(|| GridError::Validation(format!("too many columns: {width}")))?;

    let mut writes = Vec::with_capacity(rows.len() * width);
    for (row, values) in (0..row_count).zip(rows) {
        let values: &[S] = values.as_ref();
        for col in 0..col_count {
            let value = values
                .get(col as usize)
                .map(|v| v.as_ref().trim())
                .unwrap_or("");
            writes.push(CellWrite::new(CellCoord::new(row, col), value));
        }
    }

    Ok(TabularGeneration {
        writes,
        dimensions: GridDimensions::new(row_count, col_count),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::TypeTag;

    #[test]
    fn test_ragged_rows_are_padded() {
        let rows = vec![vec!["A", "B"], vec!["C"]];
        let generation = prepare_tabular(&rows).unwrap();

        assert_eq!(generation.dimensions, GridDimensions::new(2, 2));
        assert_eq!(generation.writes.len(), 4);
        let padded = &generation.writes[3];
        assert_eq!(padded.coord, CellCoord::new(1, 1));
        assert_eq!(padded.value, "");
        assert_eq!(padded.kind, TypeTag::Text);
    }

    #[test]
    fn test_values_are_trimmed_and_classified() {
        let rows = vec![vec![" 123 ", "sim", "01/02/2024"]];
        let generation = prepare_tabular(&rows).unwrap();
        let kinds: Vec<_> = generation.writes.iter().map(|w| w.kind).collect();
        assert_eq!(kinds, vec![TypeTag::Number, TypeTag::Boolean, TypeTag::Date]);
        assert_eq!(generation.writes[0].value, "123");
    }

    #[test]
    fn test_empty_source_is_rejected() {
        let rows: Vec<Vec<String>> = Vec::new();
        assert!(matches!(prepare_tabular(&rows), Err(GridError::ImportFormat(_))));
    }

    #[test]
    fn test_source_wider_than_a_sheet_is_rejected() {
        let rows = vec![vec![""; CellCoord::MAX_COLS as usize + 1]];
        assert!(matches!(prepare_tabular(&rows), Err(GridError::Validation(_))));

        let widest = vec![vec![""; CellCoord::MAX_COLS as usize]];
        let generation = prepare_tabular(&widest).unwrap();
        assert_eq!(generation.dimensions.cols, CellCoord::MAX_COLS);
    }

    #[test]
    fn test_rows_of_empty_records() {
        let rows: Vec<Vec<String>> = vec![Vec::new(), Vec::new()];
        let generation = prepare_tabular(&rows).unwrap();
        assert_eq!(generation.dimensions, GridDimensions::new(2, 0));
        assert!(generation.writes.is_empty());
    }
}
