//! Student endpoints
//!
//! Listing, search, per-student export, manual create/update and raw fact
//! lookup. Imports create students too; see `services::upsert_engine`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use roster_common::db::{Student, StudentFact};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::db::student_data::{self, GroupedFacts};
use crate::db::students;
use crate::models::{NewStudent, StudentUpdate};
use crate::{ApiError, ApiResult, AppState};

/// Minimum trimmed length of a search term
pub const MIN_SEARCH_LEN: usize = 2;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FactsQuery {
    #[serde(default)]
    pub worksheet_id: Option<i64>,
}

/// Profile plus every fact, grouped by worksheet name
#[derive(Debug, Serialize)]
pub struct StudentExport {
    pub student: Student,
    pub data: GroupedFacts,
}

/// GET /api/students
pub async fn list_students(State(state): State<AppState>) -> ApiResult<Json<Vec<Student>>> {
    Ok(Json(students::list_students(&state.db).await?))
}

/// GET /api/students/search?q=
///
/// Case-insensitive substring match on name, student number and section.
pub async fn search_students(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Student>>> {
    let term = query.q.as_deref().unwrap_or("").trim();
    if term.chars().count() < MIN_SEARCH_LEN {
        return Err(ApiError::BadRequest(format!(
            "Search query must be at least {} characters",
            MIN_SEARCH_LEN
        )));
    }

    Ok(Json(students::search_students(&state.db, term).await?))
}

/// GET /api/students/number/:student_number
pub async fn get_student_export(
    State(state): State<AppState>,
    Path(student_number): Path<String>,
) -> ApiResult<Json<StudentExport>> {
    let student_number = student_number.trim();
    if student_number.is_empty() {
        return Err(ApiError::BadRequest("Student number is required".to_string()));
    }

    let student = students::get_student_by_number(&state.db, student_number)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;
    let data = student_data::get_grouped_facts(&state.db, student.id).await?;

    Ok(Json(StudentExport { student, data }))
}

/// POST /api/students
///
/// 400 on validation problems, 409 when the student number is taken.
pub async fn create_student(
    State(state): State<AppState>,
    Json(body): Json<NewStudent>,
) -> ApiResult<(StatusCode, Json<Student>)> {
    let problems = body.validate();
    if !problems.is_empty() {
        return Err(ApiError::BadRequest(problems.join("; ")));
    }

    let student_number = body.student_number.trim();
    if students::get_student_by_number(&state.db, student_number)
        .await?
        .is_some()
    {
        return Err(duplicate_number());
    }

    let student = students::create_student(
        &state.db,
        student_number,
        body.name.trim(),
        body.section.as_deref().unwrap_or("").trim(),
        body.email.as_deref().unwrap_or("").trim(),
    )
    .await
    .map_err(|e| {
        if e.is_unique_violation() {
            duplicate_number()
        } else {
            ApiError::from(e)
        }
    })?;

    info!(student_number = %student.student_number, "Student created");
    Ok((StatusCode::CREATED, Json(student)))
}

/// PUT /api/students/:id
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StudentUpdate>,
) -> ApiResult<Json<Value>> {
    let id = parse_student_id(&id)?;

    let problems = body.validate();
    if !problems.is_empty() {
        return Err(ApiError::BadRequest(problems.join("; ")));
    }

    students::update_student(
        &state.db,
        id,
        body.name.trim(),
        body.section.as_deref().unwrap_or("").trim(),
        body.email.as_deref().unwrap_or("").trim(),
    )
    .await?;

    info!(student_id = id, "Student updated");
    Ok(Json(json!({ "message": "Student updated successfully" })))
}

/// GET /api/students/:id/data?worksheet_id=
pub async fn get_student_facts(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<FactsQuery>,
) -> ApiResult<Json<Vec<StudentFact>>> {
    let id = parse_student_id(&id)?;
    let facts = student_data::get_student_facts(&state.db, id, query.worksheet_id).await?;
    Ok(Json(facts))
}

fn parse_student_id(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest("Invalid student ID".to_string()))
}

fn duplicate_number() -> ApiError {
    ApiError::Conflict("Student with this number already exists".to_string())
}

/// Build student routes
pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/api/students", get(list_students).post(create_student))
        .route("/api/students/search", get(search_students))
        .route("/api/students/number/:student_number", get(get_student_export))
        .route("/api/students/:id", put(update_student))
        .route("/api/students/:id/data", get(get_student_facts))
}
