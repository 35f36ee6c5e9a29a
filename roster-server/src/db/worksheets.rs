//! Worksheet database operations

use roster_common::db::Worksheet;
use roster_common::Result;
use sqlx::SqlitePool;

/// Insert or refresh the worksheet identified by (name, file_name)
///
/// Re-importing a file reuses the existing row so facts keep their keys.
pub async fn upsert_worksheet(
    pool: &SqlitePool,
    name: &str,
    description: &str,
    file_name: &str,
    total_records: i64,
) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO worksheets (name, description, file_name, total_records)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(name, file_name) DO UPDATE SET
            description = excluded.description,
            total_records = excluded.total_records,
            upload_date = CURRENT_TIMESTAMP
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(file_name)
    .bind(total_records)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// All worksheets, most recently uploaded first
pub async fn list_worksheets(pool: &SqlitePool) -> Result<Vec<Worksheet>> {
    let worksheets = sqlx::query_as::<_, Worksheet>(
        "SELECT id, name, description, upload_date, file_name, total_records
         FROM worksheets
         ORDER BY upload_date DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(worksheets)
}
