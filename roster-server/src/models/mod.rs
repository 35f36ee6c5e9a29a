//! Data models for roster-server
//!
//! - Import summaries returned by the upload endpoint
//! - Request bodies for the student endpoints

pub mod import_result;
pub mod student;

pub use import_result::{ImportSummary, UploadStatus, WorksheetOutcome, WorksheetSummary};
pub use student::{NewStudent, StudentUpdate};
