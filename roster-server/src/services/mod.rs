//! Spreadsheet import pipeline

pub mod column_resolver;
pub mod import_driver;
pub mod spreadsheet_reader;
pub mod upload_store;
pub mod upsert_engine;

pub use column_resolver::{resolve_columns, ColumnError, ColumnRole, ResolvedColumns};
pub use import_driver::{ImportDriver, ImportError};
pub use spreadsheet_reader::{read_workbook, ReadError, SheetData};
pub use upload_store::{store_upload, UploadedFile};
pub use upsert_engine::{StudentChange, UpsertEngine, WorksheetError};
