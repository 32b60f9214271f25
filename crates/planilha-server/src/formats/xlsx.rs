use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::{AppError, AppResult};
use crate::export::TenantMatrix;

/// One sheet of an uploaded workbook as rows of display strings
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookSheet {
    pub title: String,
    pub rows: Vec<Vec<String>>,
}

/// Read every sheet of an xlsx/xls/ods workbook.
///
/// Positions are absolute: a used range starting below or right of A1 is
/// padded with empty rows and columns so grid coordinates match the sheet.
pub fn read_workbook(body: Vec<u8>) -> AppResult<Vec<WorkbookSheet>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(body))?;
    let titles = workbook.sheet_names().to_owned();

    let mut sheets = Vec::with_capacity(titles.len());
    for title in titles {
        let range = workbook.worksheet_range(&title)?;
        let mut rows: Vec<Vec<String>> = Vec::new();

        if let Some((start_row, start_col)) = range.start() {
            rows.resize(start_row as usize, Vec::new());
            for cells in range.rows() {
                let mut row = vec![String::new(); start_col as usize];
                row.extend(cells.iter().map(display_text));
                rows.push(row);
            }
        }

        sheets.push(WorkbookSheet { title, rows });
    }
    Ok(sheets)
}

fn display_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

/// Write one sheet per tenant matrix, in the order given.
///
/// With `labelled`, row 1 holds `LINHA, COLUNA 1..n` and column A holds
/// `L1..Ln`, shifting the data one row down and one column right.
pub fn write_workbook(sheets: &[TenantMatrix], labelled: bool) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.tenant.name())?;

        let offset = u32::from(labelled);
        if labelled {
            let width = sheet.rows.iter().map(Vec::len).max().unwrap_or(0);
            worksheet.write_string(0, 0, "LINHA")?;
            for col in 0..width {
                worksheet.write_string(0, column(col + 1)?, format!("COLUNA {}", col + 1))?;
            }
        }

        for (r, values) in sheet.rows.iter().enumerate() {
            let row = u32::try_from(r)
                .map_err(|_| AppError::Internal(format!("row {r} exceeds sheet limits")))?
                + offset;
            if labelled {
                worksheet.write_string(row, 0, format!("L{}", r + 1))?;
            }
            write_row(worksheet, row, offset as usize, values)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_row(worksheet: &mut Worksheet, row: u32, offset: usize, values: &[String]) -> AppResult<()> {
    for (c, value) in values.iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        worksheet.write_string(row, column(c + offset)?, value)?;
    }
    Ok(())
}

fn column(index: usize) -> AppResult<u16> {
    u16::try_from(index).map_err(|_| AppError::Internal(format!("column {index} exceeds sheet limits")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use planilha_core::Tenant;

    fn matrix(tenant: &str, rows: &[&[&str]]) -> TenantMatrix {
        TenantMatrix {
            tenant: Tenant::parse(tenant).unwrap(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_unlabelled_workbook_reads_back_in_place() {
        let sheets = vec![
            matrix("BARRINHA", &[&["Escola A", "123"], &["", "sim"]]),
            matrix("PONTAL", &[&["x"]]),
        ];
        let bytes = write_workbook(&sheets, false).unwrap();
        let read = read_workbook(bytes).unwrap();

        assert_eq!(read.len(), 2);
        assert_eq!(read[0].title, "BARRINHA");
        assert_eq!(read[0].rows[0], vec!["Escola A", "123"]);
        assert_eq!(read[0].rows[1], vec!["", "sim"]);
        assert_eq!(read[1].title, "PONTAL");
    }

    #[test]
    fn test_labelled_workbook_has_headers() {
        let sheets = vec![matrix("VIRADOURO", &[&["a", "b"], &["c", ""]])];
        let bytes = write_workbook(&sheets, true).unwrap();
        let read = read_workbook(bytes).unwrap();

        let rows = &read[0].rows;
        assert_eq!(rows[0], vec!["LINHA", "COLUNA 1", "COLUNA 2"]);
        assert_eq!(rows[1], vec!["L1", "a", "b"]);
        assert_eq!(rows[2][0], "L2");
        assert_eq!(rows[2][1], "c");
    }

    #[test]
    fn test_garbage_is_an_import_format_error() {
        assert!(matches!(
            read_workbook(b"not a workbook".to_vec()),
            Err(AppError::ImportFormat(_))
        ));
    }
}
