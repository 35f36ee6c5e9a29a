//! Upsert engine
//!
//! Turns one worksheet into student records and facts:
//! 1. Resolve the identifier/name/section columns (structural, may abort the sheet)
//! 2. Upsert the worksheet row for (sheet name, file name)
//! 3. For each non-blank data row, create or refresh the student, then store
//!    every non-empty cell as a fact keyed by its column header
//!
//! Row problems are collected as strings and never abort the worksheet.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::{student_data, students, worksheets};
use crate::models::{WorksheetOutcome, WorksheetSummary};
use crate::services::column_resolver::{resolve_columns, ColumnError, ResolvedColumns};
use crate::services::spreadsheet_reader::SheetData;

/// Problem that aborts a single worksheet
#[derive(Debug, Error)]
pub enum WorksheetError {
    #[error(transparent)]
    Columns(#[from] ColumnError),

    #[error(transparent)]
    Database(#[from] roster_common::Error),
}

/// What happened to the student of one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentChange {
    Created,
    Updated,
    Unchanged,
}

/// Row-level problem, reported as `Row <n>: <message>`
#[derive(Debug, Error)]
enum RowError {
    #[error("Missing student number or name")]
    MissingIdentity,

    #[error("{0}")]
    Database(#[from] roster_common::Error),
}

pub struct UpsertEngine {
    db: SqlitePool,
}

impl UpsertEngine {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Import one non-empty worksheet that came from `file_name`
    pub async fn process_worksheet(
        &self,
        sheet: &SheetData,
        file_name: &str,
    ) -> Result<WorksheetSummary, WorksheetError> {
        let headers = sheet.headers();
        let columns = resolve_columns(&sheet.name, headers)?;

        let worksheet_id = worksheets::upsert_worksheet(
            &self.db,
            &sheet.name,
            &format!("Imported from {}", file_name),
            file_name,
            sheet.data_rows().len() as i64,
        )
        .await?;

        let outcome = self.process_rows(worksheet_id, sheet, columns).await;

        debug!(
            worksheet = %sheet.name,
            processed = outcome.records_processed,
            created = outcome.students_created,
            updated = outcome.students_updated,
            errors = outcome.errors.len(),
            "Worksheet processed"
        );

        Ok(WorksheetSummary::new(
            sheet.name.clone(),
            worksheet_id,
            headers.to_vec(),
            outcome,
        ))
    }

    async fn process_rows(
        &self,
        worksheet_id: i64,
        sheet: &SheetData,
        columns: ResolvedColumns,
    ) -> WorksheetOutcome {
        let mut outcome = WorksheetOutcome::default();
        let headers = sheet.headers();

        for (index, row) in sheet.data_rows().iter().enumerate() {
            if is_blank_row(row) {
                continue;
            }

            let row_number = sheet.sheet_row_number(index);
            match self
                .upsert_row(worksheet_id, headers, row, columns, &mut outcome)
                .await
            {
                Ok(()) => outcome.records_processed += 1,
                Err(e) => {
                    warn!(worksheet = %sheet.name, row = row_number, "Row skipped: {}", e);
                    outcome.errors.push(format!("Row {}: {}", row_number, e));
                }
            }
        }

        outcome
    }

    async fn upsert_row(
        &self,
        worksheet_id: i64,
        headers: &[String],
        row: &[String],
        columns: ResolvedColumns,
        outcome: &mut WorksheetOutcome,
    ) -> Result<(), RowError> {
        let student_number = cell(row, columns.student_number);
        let name = cell(row, columns.name);
        let section = columns.section.map(|i| cell(row, i)).unwrap_or("");

        if student_number.is_empty() || name.is_empty() {
            return Err(RowError::MissingIdentity);
        }

        let (student_id, change) = self.upsert_student(student_number, name, section).await?;
        // The student write is committed even if a fact write below fails
        match change {
            StudentChange::Created => outcome.students_created += 1,
            StudentChange::Updated => outcome.students_updated += 1,
            StudentChange::Unchanged => {}
        }

        for (header, value) in headers.iter().zip(row) {
            let value = value.trim();
            if header.trim().is_empty() || value.is_empty() {
                continue;
            }
            student_data::upsert_fact(&self.db, student_id, worksheet_id, header, value).await?;
        }

        Ok(())
    }

    /// Create the student, or bring name/section in line with the sheet
    ///
    /// A sheet without a section column passes `""`, which counts as a
    /// change for a student whose stored section is set.
    pub async fn upsert_student(
        &self,
        student_number: &str,
        name: &str,
        section: &str,
    ) -> roster_common::Result<(i64, StudentChange)> {
        match students::get_student_by_number(&self.db, student_number).await? {
            None => {
                let student =
                    students::create_student(&self.db, student_number, name, section, "").await?;
                Ok((student.id, StudentChange::Created))
            }
            Some(existing) => {
                let existing_section = existing.section.as_deref().unwrap_or("");
                if existing.name == name && existing_section == section {
                    return Ok((existing.id, StudentChange::Unchanged));
                }

                students::update_student(
                    &self.db,
                    existing.id,
                    name,
                    section,
                    existing.email.as_deref().unwrap_or(""),
                )
                .await?;
                Ok((existing.id, StudentChange::Updated))
            }
        }
    }
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|s| s.trim()).unwrap_or("")
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_engine() -> (SqlitePool, UpsertEngine) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        roster_common::db::create_schema(&pool).await.unwrap();
        (pool.clone(), UpsertEngine::new(pool))
    }

    fn sheet(name: &str, rows: &[&[&str]]) -> SheetData {
        SheetData {
            name: name.to_string(),
            first_row: 0,
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_first_import_creates_second_is_unchanged() {
        let (_pool, engine) = setup_engine().await;
        let roster = sheet(
            "Roster",
            &[&["Student Number", "Name", "Section"], &["S100", "Ann Lee", "A"]],
        );

        let first = engine.process_worksheet(&roster, "roster.xlsx").await.unwrap();
        assert_eq!(first.students_created, 1);
        assert_eq!(first.records_processed, 1);

        let second = engine.process_worksheet(&roster, "roster.xlsx").await.unwrap();
        assert_eq!(second.students_created, 0);
        assert_eq!(second.students_updated, 0);
        assert_eq!(second.records_processed, 1);
        assert_eq!(first.id, second.id, "worksheet row must be reused");
    }

    #[tokio::test]
    async fn test_section_change_updates_in_place() {
        let (pool, engine) = setup_engine().await;
        engine
            .process_worksheet(
                &sheet("Roster", &[&["ID", "Name", "Section"], &["S100", "Ann Lee", "A"]]),
                "roster.xlsx",
            )
            .await
            .unwrap();

        let summary = engine
            .process_worksheet(
                &sheet("Roster", &[&["ID", "Name", "Section"], &["S100", "Ann Lee", "B"]]),
                "roster.xlsx",
            )
            .await
            .unwrap();
        assert_eq!(summary.students_created, 0);
        assert_eq!(summary.students_updated, 1);

        let student = students::get_student_by_number(&pool, "S100").await.unwrap().unwrap();
        assert_eq!(student.section.as_deref(), Some("B"));
        assert_eq!(students::list_students(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_identifier_row_is_skipped_and_reported() {
        let (pool, engine) = setup_engine().await;
        let roster = sheet(
            "Roster",
            &[
                &["ID", "Name"],
                &["S1", "Ann"],
                &["  ", "Nobody"],
                &["S3", "Cy"],
            ],
        );

        let summary = engine.process_worksheet(&roster, "roster.xlsx").await.unwrap();
        assert_eq!(summary.records_processed, 2);
        assert_eq!(summary.errors, vec!["Row 3: Missing student number or name".to_string()]);
        assert_eq!(students::list_students(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_rows_are_silently_ignored() {
        let (_pool, engine) = setup_engine().await;
        let roster = sheet("Roster", &[&["ID", "Name"], &["", " "], &["S1", "Ann"]]);

        let summary = engine.process_worksheet(&roster, "roster.xlsx").await.unwrap();
        assert_eq!(summary.records_processed, 1);
        assert!(summary.errors.is_empty());
    }

    #[tokio::test]
    async fn test_every_non_empty_cell_becomes_a_fact() {
        let (pool, engine) = setup_engine().await;
        let grades = sheet(
            "Grades",
            &[&["ID", "Name", "Quiz 1", "", "Notes"], &["S1", "Ann", " 9 ", "stray", ""]],
        );

        let summary = engine.process_worksheet(&grades, "grades.xlsx").await.unwrap();
        let student = students::get_student_by_number(&pool, "S1").await.unwrap().unwrap();
        let facts = student_data::get_student_facts(&pool, student.id, Some(summary.id))
            .await
            .unwrap();

        let keys: Vec<&str> = facts.iter().map(|f| f.data_key.as_str()).collect();
        assert_eq!(keys, vec!["ID", "Name", "Quiz 1"]);
        assert_eq!(facts[2].data_value.as_deref(), Some("9"));
    }

    #[tokio::test]
    async fn test_missing_columns_abort_before_any_write() {
        let (pool, engine) = setup_engine().await;
        let notes = sheet("Notes", &[&["Comment"], &["hello"]]);

        let err = engine.process_worksheet(&notes, "notes.xlsx").await.unwrap_err();
        assert!(matches!(
            err,
            WorksheetError::Columns(ColumnError::MissingIdentifierColumn { .. })
        ));
        assert!(worksheets::list_worksheets(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sheet_without_section_clears_stored_section() {
        let (pool, engine) = setup_engine().await;
        engine
            .process_worksheet(
                &sheet("Roster", &[&["ID", "Name", "Section"], &["S1", "Ann", "A"]]),
                "term1.xlsx",
            )
            .await
            .unwrap();

        let summary = engine
            .process_worksheet(
                &sheet("Grades", &[&["ID", "Name", "Quiz"], &["S1", "Ann", "9"]]),
                "term1.xlsx",
            )
            .await
            .unwrap();
        assert_eq!(summary.students_updated, 1);

        let student = students::get_student_by_number(&pool, "S1").await.unwrap().unwrap();
        assert_eq!(student.section.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_created_student_counted_when_fact_write_fails() {
        let (pool, engine) = setup_engine().await;
        sqlx::query("DROP TABLE student_data").execute(&pool).await.unwrap();

        let summary = engine
            .process_worksheet(&sheet("Roster", &[&["ID", "Name"], &["S1", "Ann"]]), "roster.xlsx")
            .await
            .unwrap();

        assert_eq!(summary.students_created, 1);
        assert_eq!(summary.records_processed, 0);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].starts_with("Row 2: "));
        assert!(students::get_student_by_number(&pool, "S1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_keeps_existing_email() {
        let (pool, engine) = setup_engine().await;
        let created = students::create_student(&pool, "S1", "Ann", "A", "ann@school.edu")
            .await
            .unwrap();

        let (id, change) = engine.upsert_student("S1", "Ann Lee", "A").await.unwrap();
        assert_eq!(id, created.id);
        assert_eq!(change, StudentChange::Updated);

        let student = students::get_student(&pool, id).await.unwrap().unwrap();
        assert_eq!(student.email.as_deref(), Some("ann@school.edu"));
    }
}
