//! Database access for roster-server
//!
//! One module per table. Schema creation lives in `roster_common::db`.

pub mod student_data;
pub mod students;
pub mod upload_history;
pub mod worksheets;
