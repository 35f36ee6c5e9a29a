//! Upload audit log operations
//!
//! The log is append-only: rows are inserted once per import and never updated.

use roster_common::db::UploadRecord;
use roster_common::Result;
use sqlx::SqlitePool;

use crate::models::UploadStatus;

/// Number of rows returned by [`recent_uploads`]
pub const HISTORY_LIMIT: i64 = 50;

/// Audit entry to append
#[derive(Debug, Clone)]
pub struct NewUploadRecord<'a> {
    /// Name of the stored temporary file
    pub file_name: &'a str,
    /// Name the client uploaded the file under
    pub original_name: &'a str,
    pub file_size: u64,
    pub records_processed: usize,
    pub status: UploadStatus,
}

pub async fn record_upload(pool: &SqlitePool, record: &NewUploadRecord<'_>) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO upload_history (file_name, original_name, file_size, records_processed, status)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(record.file_name)
    .bind(record.original_name)
    .bind(record.file_size as i64)
    .bind(record.records_processed as i64)
    .bind(record.status.as_str())
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// The most recent uploads, newest first
pub async fn recent_uploads(pool: &SqlitePool) -> Result<Vec<UploadRecord>> {
    let records = sqlx::query_as::<_, UploadRecord>(
        "SELECT id, file_name, original_name, file_size, records_processed, upload_date, status
         FROM upload_history
         ORDER BY upload_date DESC, id DESC
         LIMIT ?",
    )
    .bind(HISTORY_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_history_is_capped_and_newest_first() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        roster_common::db::create_schema(&pool).await.unwrap();

        for i in 0..(HISTORY_LIMIT + 5) {
            let name = format!("upload-{}.xlsx", i);
            record_upload(
                &pool,
                &NewUploadRecord {
                    file_name: &name,
                    original_name: &name,
                    file_size: 1024,
                    records_processed: i as usize,
                    status: UploadStatus::Completed,
                },
            )
            .await
            .unwrap();
        }

        let history = recent_uploads(&pool).await.unwrap();
        assert_eq!(history.len() as i64, HISTORY_LIMIT);
        assert_eq!(history[0].original_name, format!("upload-{}.xlsx", HISTORY_LIMIT + 4));
        assert_eq!(history[0].status, "completed");
    }
}
