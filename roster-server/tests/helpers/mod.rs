//! Test Helper Utilities
//!
//! Shared utilities for roster-server integration tests

#![allow(dead_code)]

pub mod multipart;
pub mod workbook;

pub use multipart::{multipart_request, UPLOAD_BOUNDARY};
pub use workbook::{workbook_bytes, Cell, SheetSpec};

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use roster_common::db::init_database;
use roster_server::AppState;
use serde_json::Value;
use tempfile::TempDir;

/// Default upload limit used by test state
pub const TEST_MAX_UPLOAD_BYTES: u64 = 1024 * 1024;

/// Create app state backed by a database in a temporary root folder
///
/// Returns (TempDir, AppState) - TempDir must be kept alive for duration of test
pub async fn create_test_state() -> (TempDir, AppState) {
    let temp_dir = TempDir::new().unwrap();
    let db = init_database(&temp_dir.path().join("roster.db")).await.unwrap();
    let uploads_dir = temp_dir.path().join("uploads");
    std::fs::create_dir_all(&uploads_dir).unwrap();

    let state = AppState::new(db, uploads_dir, TEST_MAX_UPLOAD_BYTES);
    (temp_dir, state)
}

/// Number of files currently left in the uploads folder
pub fn uploads_left(state: &AppState) -> usize {
    std::fs::read_dir(&state.uploads_dir).unwrap().count()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Collect a response body as JSON
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
