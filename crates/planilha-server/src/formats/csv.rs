use planilha_core::{CellRecord, DelimitedRecord};

use crate::error::{AppError, AppResult};

const ROW_HEADERS: [&str; 2] = ["linha", "row"];
const COL_HEADERS: [&str; 3] = ["coluna", "column", "col"];
const VALUE_HEADERS: [&str; 2] = ["valor", "value"];

/// Header written by [`write_records`]
pub const RECORD_HEADER: [&str; 3] = ["Linha", "Coluna", "Valor"];

/// Read a headerless CSV into rows of strings; ragged rows are kept as-is
pub fn parse_tabular(body: &[u8]) -> AppResult<Vec<Vec<String>>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Read `(row, column, value)` records.
///
/// The header names the fields (case-insensitive). A row or column that is
/// empty or not an integer becomes `None`, so the record is skipped on import.
pub fn parse_records(body: &[u8]) -> AppResult<Vec<DelimitedRecord>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(::csv::Trim::Headers)
        .from_reader(body);

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::ImportFormat("record source has no header".to_string()));
    }

    let position = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    };
    let row_at = position(&ROW_HEADERS[..])
        .ok_or_else(|| AppError::ImportFormat("header has no row field".to_string()))?;
    let col_at = position(&COL_HEADERS[..])
        .ok_or_else(|| AppError::ImportFormat("header has no column field".to_string()))?;
    let value_at = position(&VALUE_HEADERS[..]);

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(DelimitedRecord {
            row: parse_index(record.get(row_at)),
            col: parse_index(record.get(col_at)),
            value: value_at.and_then(|i| record.get(i)).map(str::to_string),
        });
    }
    Ok(records)
}

fn parse_index(field: Option<&str>) -> Option<i64> {
    field.map(str::trim).filter(|f| !f.is_empty())?.parse().ok()
}

/// Write records under the `Linha,Coluna,Valor` header
pub fn write_records(records: &[CellRecord]) -> AppResult<Vec<u8>> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer.write_record(RECORD_HEADER)?;
    for record in records {
        writer.write_record([
            record.row.to_string(),
            record.col.to_string(),
            record.value.clone(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("csv writer: {e}")))
}
