//! Workbook fixtures
//!
//! Builds real .xlsx files in memory so the import pipeline is exercised
//! through calamine exactly as with an uploaded file.

use rust_xlsxwriter::Workbook;

/// A cell value to write
#[derive(Debug, Clone)]
pub enum Cell {
    Text(&'static str),
    Number(f64),
    Blank,
}

impl From<&'static str> for Cell {
    fn from(value: &'static str) -> Self {
        if value.is_empty() {
            Cell::Blank
        } else {
            Cell::Text(value)
        }
    }
}

/// One worksheet: name plus rows; an empty row list leaves the sheet blank
#[derive(Debug, Clone)]
pub struct SheetSpec {
    pub name: &'static str,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetSpec {
    /// Sheet whose cells are all text
    pub fn text(name: &'static str, rows: &[&[&'static str]]) -> Self {
        Self {
            name,
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| Cell::from(*c)).collect())
                .collect(),
        }
    }

    pub fn empty(name: &'static str) -> Self {
        Self {
            name,
            rows: Vec::new(),
        }
    }
}

/// Serialize the sheets, in order, to .xlsx bytes
pub fn workbook_bytes(sheets: &[SheetSpec]) -> Vec<u8> {
    let mut workbook = Workbook::new();

    for spec in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(spec.name).unwrap();

        for (row_idx, row) in spec.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let (r, c) = (row_idx as u32, col_idx as u16);
                match cell {
                    Cell::Text(text) => {
                        worksheet.write_string(r, c, *text).unwrap();
                    }
                    Cell::Number(value) => {
                        worksheet.write_number(r, c, *value).unwrap();
                    }
                    Cell::Blank => {}
                }
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}
