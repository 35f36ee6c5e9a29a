//! Import driver
//!
//! Runs one uploaded workbook through the pipeline:
//! read workbook → per worksheet (resolve columns, upsert rows) → audit → cleanup.
//!
//! Worksheet problems are folded into the summary. Only an unreadable file
//! (or a failing audit write) aborts the import. The uploaded file is
//! removed on every path.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::upload_history::{self, NewUploadRecord};
use crate::models::ImportSummary;
use crate::services::spreadsheet_reader::{read_workbook, ReadError};
use crate::services::upload_store::UploadedFile;
use crate::services::upsert_engine::UpsertEngine;

/// Problem that aborts a whole import
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to process Excel file: {0}")]
    Unreadable(#[from] ReadError),

    #[error("Failed to process Excel file: {0}")]
    Database(#[from] roster_common::Error),

    #[error("Failed to process Excel file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to process Excel file: workbook reader stopped: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub struct ImportDriver {
    db: SqlitePool,
    engine: UpsertEngine,
}

impl ImportDriver {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            engine: UpsertEngine::new(db.clone()),
            db,
        }
    }

    /// Import an uploaded workbook, then delete it
    pub async fn import_file(&self, upload: &UploadedFile) -> Result<ImportSummary, ImportError> {
        let result = self.run(upload).await;

        if let Err(e) = tokio::fs::remove_file(&upload.path).await {
            warn!(file = %upload.path.display(), "Failed to remove uploaded file: {}", e);
        }

        match &result {
            Ok(summary) => info!(
                file = %upload.original_name,
                worksheets = summary.worksheets.len(),
                records = summary.total_records,
                errors = summary.errors.len(),
                "Import finished"
            ),
            Err(e) => warn!(file = %upload.original_name, "Import failed: {}", e),
        }

        result
    }

    async fn run(&self, upload: &UploadedFile) -> Result<ImportSummary, ImportError> {
        let file_size = tokio::fs::metadata(&upload.path).await?.len();
        info!(file = %upload.original_name, bytes = file_size, "Import started");

        let path = upload.path.clone();
        let sheets = tokio::task::spawn_blocking(move || read_workbook(&path)).await??;

        let mut summary = ImportSummary::default();
        for sheet in &sheets {
            if sheet.is_empty() {
                summary.record_error(format!("Worksheet \"{}\" is empty", sheet.name));
                continue;
            }

            match self
                .engine
                .process_worksheet(sheet, &upload.original_name)
                .await
            {
                Ok(worksheet) => summary.record_worksheet(worksheet),
                Err(e) => {
                    warn!(worksheet = %sheet.name, "Worksheet skipped: {}", e);
                    summary.record_error(format!("Error in worksheet \"{}\": {}", sheet.name, e));
                }
            }
        }

        let stored_name = upload.stored_name();
        upload_history::record_upload(
            &self.db,
            &NewUploadRecord {
                file_name: &stored_name,
                original_name: &upload.original_name,
                file_size,
                records_processed: summary.total_records,
                status: summary.status(),
            },
        )
        .await?;

        Ok(summary)
    }
}
