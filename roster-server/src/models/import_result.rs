//! Import result types
//!
//! The upload endpoint returns an [`ImportSummary`]. Field names are
//! camelCase to match what the portal front end reads.

use serde::{Deserialize, Serialize};

/// Status written to the upload audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Completed,
    CompletedWithErrors,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Completed => "completed",
            UploadStatus::CompletedWithErrors => "completed_with_errors",
        }
    }
}

/// Counters produced by the upsert engine for a single worksheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorksheetOutcome {
    pub records_processed: usize,
    pub students_created: usize,
    pub students_updated: usize,
    /// Row-level problems; the rows were skipped
    pub errors: Vec<String>,
}

/// Per-worksheet entry of the import summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorksheetSummary {
    pub name: String,
    pub id: i64,
    pub headers: Vec<String>,
    pub records_processed: usize,
    pub students_created: usize,
    pub students_updated: usize,
    pub errors: Vec<String>,
}

impl WorksheetSummary {
    pub fn new(name: String, id: i64, headers: Vec<String>, outcome: WorksheetOutcome) -> Self {
        Self {
            name,
            id,
            headers,
            records_processed: outcome.records_processed,
            students_created: outcome.students_created,
            students_updated: outcome.students_updated,
            errors: outcome.errors,
        }
    }
}

/// Result of importing one spreadsheet file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub worksheets: Vec<WorksheetSummary>,
    pub total_records: usize,
    /// Every error of the import: row errors of each worksheet, then
    /// worksheet-level errors, in the order they happened
    pub errors: Vec<String>,
}

impl ImportSummary {
    /// Fold a finished worksheet into the totals
    pub fn record_worksheet(&mut self, worksheet: WorksheetSummary) {
        self.total_records += worksheet.records_processed;
        self.errors.extend(worksheet.errors.iter().cloned());
        self.worksheets.push(worksheet);
    }

    /// Record an error that prevented a whole worksheet from importing
    pub fn record_error(&mut self, message: String) {
        self.errors.push(message);
    }

    pub fn students_created(&self) -> usize {
        self.worksheets.iter().map(|w| w.students_created).sum()
    }

    pub fn students_updated(&self) -> usize {
        self.worksheets.iter().map(|w| w.students_updated).sum()
    }

    pub fn status(&self) -> UploadStatus {
        if self.errors.is_empty() {
            UploadStatus::Completed
        } else {
            UploadStatus::CompletedWithErrors
        }
    }
}
