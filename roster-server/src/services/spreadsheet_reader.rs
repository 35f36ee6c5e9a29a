//! Spreadsheet reader
//!
//! Opens a workbook with calamine and converts every sheet, in file order,
//! into row-major cell text. The format is picked from the file extension
//! (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).

use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use thiserror::Error;

/// The workbook could not be read at all
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("{0}")]
    Workbook(#[from] calamine::Error),

    #[error("cannot read worksheet \"{sheet}\": {source}")]
    Worksheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },
}

/// One worksheet as text
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    /// 0-based sheet row of `rows[0]`
    pub first_row: u32,
    pub rows: Vec<Vec<String>>,
}

impl SheetData {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row of the used range
    pub fn headers(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every row after the header row
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// 1-based spreadsheet row number of a data row, as a user sees it
    pub fn sheet_row_number(&self, data_index: usize) -> usize {
        self.first_row as usize + data_index + 2
    }
}

/// Read every worksheet of the workbook at `path`
pub fn read_workbook(path: &Path) -> Result<Vec<SheetData>, ReadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names();

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|source| ReadError::Worksheet {
                sheet: name.clone(),
                source,
            })?;

        let first_row = range.start().map(|(row, _)| row).unwrap_or(0);
        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        sheets.push(SheetData {
            name,
            first_row,
            rows,
        });
    }

    Ok(sheets)
}

/// Text form of a cell
///
/// Integral floats drop their fraction (`100.0` becomes `"100"`) since
/// spreadsheets store every number as a float. Dates keep their serial
/// number.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_cell_text_numbers() {
        assert_eq!(cell_text(&Data::Float(100.0)), "100");
        assert_eq!(cell_text(&Data::Float(-3.0)), "-3");
        assert_eq!(cell_text(&Data::Float(92.5)), "92.5");
        assert_eq!(cell_text(&Data::Float(0.1)), "0.1");
        assert_eq!(cell_text(&Data::Int(42)), "42");
    }

    #[test]
    fn test_cell_text_other_kinds() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::String("Ann Lee".into())), "Ann Lee");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::DateTimeIso("2024-09-01".into())), "2024-09-01");
        assert_eq!(cell_text(&Data::Error(CellErrorType::Div0)), "#DIV/0!");
    }

    #[test]
    fn test_row_numbers_follow_used_range() {
        let sheet = SheetData {
            name: "Roster".to_string(),
            first_row: 2,
            rows: vec![
                vec!["ID".into(), "Name".into()],
                vec!["S1".into(), "Ann".into()],
            ],
        };
        assert_eq!(sheet.headers().len(), 2);
        assert_eq!(sheet.data_rows().len(), 1);
        // Header on sheet row 3, first data row on sheet row 4
        assert_eq!(sheet.sheet_row_number(0), 4);
    }

    #[test]
    fn test_empty_sheet_accessors() {
        let sheet = SheetData {
            name: "Blank".to_string(),
            first_row: 0,
            rows: Vec::new(),
        };
        assert!(sheet.is_empty());
        assert!(sheet.headers().is_empty());
        assert!(sheet.data_rows().is_empty());
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not a spreadsheet").unwrap();

        assert!(read_workbook(&path).is_err());
    }
}
