//! Database models
//!
//! One struct per table row. Field names match column names so the JSON
//! served to the front end mirrors the schema.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Row of the `students` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub student_number: String,
    pub name: String,
    pub section: Option<String>,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Row of the `worksheets` table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Worksheet {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub upload_date: NaiveDateTime,
    pub file_name: Option<String>,
    pub total_records: i64,
}

/// Row of the `student_data` table: one (student, worksheet, key) fact
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentFact {
    pub id: i64,
    pub student_id: i64,
    pub worksheet_id: i64,
    pub data_key: String,
    pub data_value: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Row of the `upload_history` audit table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UploadRecord {
    pub id: i64,
    pub file_name: String,
    pub original_name: String,
    pub file_size: Option<i64>,
    pub records_processed: Option<i64>,
    pub upload_date: NaiveDateTime,
    pub status: String,
}
