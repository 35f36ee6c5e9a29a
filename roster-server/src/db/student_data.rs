//! Student fact operations
//!
//! A fact is one cell of an imported worksheet that is not part of the
//! core student profile, keyed by (student, worksheet, column header).

use roster_common::db::StudentFact;
use roster_common::Result;
use sqlx::SqlitePool;
use std::collections::BTreeMap;

/// Facts grouped as worksheet name -> column header -> value
pub type GroupedFacts = BTreeMap<String, BTreeMap<String, String>>;

/// Store a fact; the last write for a (student, worksheet, key) triple wins
pub async fn upsert_fact(
    pool: &SqlitePool,
    student_id: i64,
    worksheet_id: i64,
    data_key: &str,
    data_value: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO student_data (student_id, worksheet_id, data_key, data_value)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(student_id, worksheet_id, data_key) DO UPDATE SET
            data_value = excluded.data_value,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(student_id)
    .bind(worksheet_id)
    .bind(data_key)
    .bind(data_value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Facts of one student, optionally restricted to one worksheet
pub async fn get_student_facts(
    pool: &SqlitePool,
    student_id: i64,
    worksheet_id: Option<i64>,
) -> Result<Vec<StudentFact>> {
    let facts = match worksheet_id {
        Some(worksheet_id) => {
            sqlx::query_as::<_, StudentFact>(
                "SELECT id, student_id, worksheet_id, data_key, data_value, created_at, updated_at
                 FROM student_data
                 WHERE student_id = ? AND worksheet_id = ?
                 ORDER BY worksheet_id, id",
            )
            .bind(student_id)
            .bind(worksheet_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, StudentFact>(
                "SELECT id, student_id, worksheet_id, data_key, data_value, created_at, updated_at
                 FROM student_data
                 WHERE student_id = ?
                 ORDER BY worksheet_id, id",
            )
            .bind(student_id)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(facts)
}

/// Facts of one student grouped by worksheet name
pub async fn get_grouped_facts(pool: &SqlitePool, student_id: i64) -> Result<GroupedFacts> {
    let rows: Vec<(String, String, Option<String>)> = sqlx::query_as(
        r#"
        SELECT COALESCE(w.name, 'Unknown'), d.data_key, d.data_value
        FROM student_data d
        LEFT JOIN worksheets w ON w.id = d.worksheet_id
        WHERE d.student_id = ?
        ORDER BY d.worksheet_id, d.id
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    let mut grouped = GroupedFacts::new();
    for (worksheet, key, value) in rows {
        grouped
            .entry(worksheet)
            .or_default()
            .insert(key, value.unwrap_or_default());
    }

    Ok(grouped)
}

/// Total number of stored facts
pub async fn count_facts(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM student_data")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{students, worksheets};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        roster_common::db::create_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let pool = setup_test_db().await;
        let student = students::create_student(&pool, "S1", "Ann", "", "").await.unwrap();
        let sheet = worksheets::upsert_worksheet(&pool, "Grades", "", "t.xlsx", 1).await.unwrap();

        upsert_fact(&pool, student.id, sheet, "Quiz 1", "7").await.unwrap();
        upsert_fact(&pool, student.id, sheet, "Quiz 1", "9").await.unwrap();

        let facts = get_student_facts(&pool, student.id, None).await.unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].data_value.as_deref(), Some("9"));
        assert_eq!(count_facts(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_worksheet_filter_and_grouping() {
        let pool = setup_test_db().await;
        let student = students::create_student(&pool, "S1", "Ann", "", "").await.unwrap();
        let grades = worksheets::upsert_worksheet(&pool, "Grades", "", "t.xlsx", 1).await.unwrap();
        let attendance = worksheets::upsert_worksheet(&pool, "Attendance", "", "t.xlsx", 1).await.unwrap();

        upsert_fact(&pool, student.id, grades, "Quiz 1", "9").await.unwrap();
        upsert_fact(&pool, student.id, attendance, "Week 1", "present").await.unwrap();

        let only_grades = get_student_facts(&pool, student.id, Some(grades)).await.unwrap();
        assert_eq!(only_grades.len(), 1);
        assert_eq!(only_grades[0].data_key, "Quiz 1");

        let grouped = get_grouped_facts(&pool, student.id).await.unwrap();
        assert_eq!(grouped["Grades"]["Quiz 1"], "9");
        assert_eq!(grouped["Attendance"]["Week 1"], "present");
    }

    #[tokio::test]
    async fn test_same_key_in_two_worksheets_is_two_facts() {
        let pool = setup_test_db().await;
        let student = students::create_student(&pool, "S1", "Ann", "", "").await.unwrap();
        let a = worksheets::upsert_worksheet(&pool, "Term 1", "", "t.xlsx", 1).await.unwrap();
        let b = worksheets::upsert_worksheet(&pool, "Term 2", "", "t.xlsx", 1).await.unwrap();

        upsert_fact(&pool, student.id, a, "Score", "80").await.unwrap();
        upsert_fact(&pool, student.id, b, "Score", "90").await.unwrap();

        assert_eq!(count_facts(&pool).await.unwrap(), 2);
    }
}
