//! Spreadsheet upload endpoints
//!
//! POST /api/upload/excel takes a multipart form with the workbook in the
//! `excelFile` field, stores it in the uploads folder and runs the import
//! while holding the import lock.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use roster_common::db::{UploadRecord, Worksheet};
use serde::Serialize;
use tracing::info;

use crate::db::{upload_history, worksheets};
use crate::models::ImportSummary;
use crate::services::upload_store::{self, has_allowed_extension};
use crate::services::ImportDriver;
use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying the workbook
pub const UPLOAD_FIELD: &str = "excelFile";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub results: ImportSummary,
}

struct ReceivedFile {
    name: String,
    bytes: Vec<u8>,
}

/// POST /api/upload/excel
pub async fn upload_excel(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let multipart = multipart.map_err(|_| no_file())?;
    let received = read_upload_field(multipart, state.max_upload_bytes)
        .await?
        .ok_or_else(no_file)?;

    if !has_allowed_extension(&received.name) {
        return Err(ApiError::BadRequest(
            "Only Excel files (.xlsx, .xls) are allowed".to_string(),
        ));
    }

    info!(file = %received.name, bytes = received.bytes.len(), "File uploaded");
    let stored = upload_store::store_upload(&state.uploads_dir, &received.name, &received.bytes).await?;

    let _guard = state.import_lock.lock().await;
    let results = ImportDriver::new(state.db.clone())
        .import_file(&stored)
        .await
        .map_err(|e| ApiError::ImportFailed(e.to_string()))?;

    Ok(Json(UploadResponse {
        message: "File processed successfully".to_string(),
        results,
    }))
}

/// Pull the `excelFile` part out of the form, ignoring any other fields
async fn read_upload_field(
    mut multipart: Multipart,
    max_bytes: u64,
) -> ApiResult<Option<ReceivedFile>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.len() as u64 > max_bytes {
            return Err(too_large(max_bytes));
        }

        return Ok(Some(ReceivedFile {
            name,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

fn no_file() -> ApiError {
    ApiError::BadRequest("No file uploaded".to_string())
}

fn too_large(max_bytes: u64) -> ApiError {
    ApiError::PayloadTooLarge(format!("File exceeds the {} byte upload limit", max_bytes))
}

/// GET /api/upload/history
pub async fn get_upload_history(State(state): State<AppState>) -> ApiResult<Json<Vec<UploadRecord>>> {
    Ok(Json(upload_history::recent_uploads(&state.db).await?))
}

/// GET /api/upload/worksheets
pub async fn list_worksheets(State(state): State<AppState>) -> ApiResult<Json<Vec<Worksheet>>> {
    Ok(Json(worksheets::list_worksheets(&state.db).await?))
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/api/upload/excel", post(upload_excel))
        .route("/api/upload/history", get(get_upload_history))
        .route("/api/upload/worksheets", get(list_worksheets))
}
