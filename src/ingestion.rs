// Spreadsheet import (xlsx, xls, xlsb, ods).
//
// Only the first worksheet is read. Its first row is a header whose text is
// ignored: columns are taken positionally as label, prior year, current year.

use crate::coercion::coerce_rows;
use crate::error::{AnalysisError, Result};
use crate::schema::{FinancialTable, RawCell, RawRow};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use log::{debug, info};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

pub const EXPECTED_COLUMNS: usize = 3;

/// Reads the raw rows of the first worksheet of a workbook on disk.
pub fn read_workbook(path: &Path) -> Result<Vec<RawRow>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        AnalysisError::Spreadsheet(format!("Failed to open '{}': {}", path.display(), e))
    })?;
    first_sheet_rows(&mut workbook)
}

/// Reads the raw rows of the first worksheet of an in-memory workbook.
pub fn read_workbook_bytes(bytes: Vec<u8>) -> Result<Vec<RawRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AnalysisError::Spreadsheet(format!("Failed to open workbook: {}", e)))?;
    first_sheet_rows(&mut workbook)
}

/// Reads and coerces a workbook on disk in one step.
pub fn load_table(path: &Path) -> Result<FinancialTable> {
    let rows = read_workbook(path)?;
    let table = coerce_rows(&rows);
    info!("Loaded {} line items from {}", table.len(), path.display());
    Ok(table)
}

fn first_sheet_rows<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Vec<RawRow>> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(AnalysisError::EmptyWorkbook)?;

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        AnalysisError::Spreadsheet(format!("Failed to read sheet '{}': {}", sheet_name, e))
    })?;

    debug!("Reading sheet '{}' ({:?})", sheet_name, range.get_size());
    rows_from_range(&range)
}

pub fn rows_from_range(range: &Range<Data>) -> Result<Vec<RawRow>> {
    let (_, width) = range.get_size();
    if width != EXPECTED_COLUMNS {
        return Err(AnalysisError::ColumnCount(width));
    }

    let rows = range
        .rows()
        .skip(1)
        .map(|cells| RawRow {
            label: label_to_raw(&cells[0]),
            prior: cell_to_raw(&cells[1]),
            current: cell_to_raw(&cells[2]),
        })
        .filter(|row| !row.is_blank())
        .collect();

    Ok(rows)
}

/// Labels keep the text of date cells, which carry no amount but still name a row.
fn label_to_raw(cell: &Data) -> RawCell {
    match cell {
        Data::DateTime(_) => RawCell::Text(cell.to_string()),
        other => cell_to_raw(other),
    }
}

fn cell_to_raw(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) if s.is_empty() => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(n) => RawCell::Number(*n),
        Data::Int(n) => RawCell::Number(*n as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        // Dates and formula errors carry no usable amount.
        Data::DateTime(_) | Data::Error(_) => RawCell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    fn range_from(rows: Vec<Vec<Data>>) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height.saturating_sub(1), width.saturating_sub(1)));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), cell);
            }
        }
        range
    }

    #[test]
    fn test_header_is_skipped_and_cells_mapped() {
        let range = range_from(vec![
            vec![
                Data::String("Item".into()),
                Data::String("2023".into()),
                Data::String("2024".into()),
            ],
            vec![
                Data::String("TOTAL ASSETS".into()),
                Data::Float(1000.0),
                Data::Int(1200),
            ],
            vec![
                Data::String("Cash".into()),
                Data::String("n/a".into()),
                Data::Bool(true),
            ],
        ]);

        let rows = rows_from_range(&range).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], RawRow::new("TOTAL ASSETS", 1000.0, 1200.0));
        assert_eq!(rows[1].prior, RawCell::text("n/a"));
        assert_eq!(rows[1].current, RawCell::Bool(true));
    }

    #[test]
    fn test_date_label_keeps_its_text() {
        let date = Data::DateTime(ExcelDateTime::new(45291.0, ExcelDateTimeType::DateTime, false));
        let range = range_from(vec![
            vec![Data::String("h".into()), Data::String("p".into()), Data::String("c".into())],
            vec![date.clone(), Data::Float(5.0), date.clone()],
        ]);

        let rows = rows_from_range(&range).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, RawCell::Text(date.to_string()));
        assert!(!date.to_string().is_empty());
        assert_eq!(rows[0].current, RawCell::Empty);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let range = range_from(vec![
            vec![Data::String("h".into()), Data::String("p".into()), Data::String("c".into())],
            vec![Data::Empty, Data::Empty, Data::Empty],
            vec![Data::String("Cash".into()), Data::Float(1.0), Data::Float(2.0)],
        ]);

        let rows = rows_from_range(&range).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, RawCell::text("Cash"));
    }

    #[test]
    fn test_wrong_column_count_is_rejected() {
        let range = range_from(vec![vec![
            Data::String("Item".into()),
            Data::String("2023".into()),
        ]]);

        match rows_from_range(&range) {
            Err(AnalysisError::ColumnCount(2)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unreadable_bytes_are_a_spreadsheet_error() {
        let result = read_workbook_bytes(b"definitely not a workbook".to_vec());
        assert!(matches!(result, Err(AnalysisError::Spreadsheet(_))));
    }
}
