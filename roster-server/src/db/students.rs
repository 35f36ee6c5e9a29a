//! Student database operations

use roster_common::db::Student;
use roster_common::{Error, Result};
use sqlx::SqlitePool;

const STUDENT_COLUMNS: &str =
    "id, student_number, name, section, email, created_at, updated_at";

/// Look up a student by external identifier
pub async fn get_student_by_number(pool: &SqlitePool, student_number: &str) -> Result<Option<Student>> {
    let student = sqlx::query_as::<_, Student>(&format!(
        "SELECT {} FROM students WHERE student_number = ?",
        STUDENT_COLUMNS
    ))
    .bind(student_number)
    .fetch_optional(pool)
    .await?;

    Ok(student)
}

pub async fn get_student(pool: &SqlitePool, id: i64) -> Result<Option<Student>> {
    let student = sqlx::query_as::<_, Student>(&format!(
        "SELECT {} FROM students WHERE id = ?",
        STUDENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(student)
}

/// All students ordered by display name
pub async fn list_students(pool: &SqlitePool) -> Result<Vec<Student>> {
    let students = sqlx::query_as::<_, Student>(&format!(
        "SELECT {} FROM students ORDER BY name, id",
        STUDENT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(students)
}

/// Insert a new student
///
/// Fails with a unique violation when `student_number` already exists.
pub async fn create_student(
    pool: &SqlitePool,
    student_number: &str,
    name: &str,
    section: &str,
    email: &str,
) -> Result<Student> {
    let student = sqlx::query_as::<_, Student>(&format!(
        "INSERT INTO students (student_number, name, section, email) VALUES (?, ?, ?, ?) RETURNING {}",
        STUDENT_COLUMNS
    ))
    .bind(student_number)
    .bind(name)
    .bind(section)
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(student)
}

/// Overwrite a student's profile fields
///
/// Returns false when no student has the given id.
pub async fn update_student(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    section: &str,
    email: &str,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE students SET name = ?, section = ?, email = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(name)
    .bind(section)
    .bind(email)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Student not found".to_string()));
    }
    Ok(())
}

/// Case-insensitive substring search over name, number and section
pub async fn search_students(pool: &SqlitePool, term: &str) -> Result<Vec<Student>> {
    let needle = term.trim().to_lowercase();
    let students = list_students(pool).await?;

    Ok(students
        .into_iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle)
                || s.student_number.to_lowercase().contains(&needle)
                || s.section
                    .as_deref()
                    .is_some_and(|section| section.to_lowercase().contains(&needle))
        })
        .collect())
}
