//! HTTP API handlers for roster-server

pub mod health;
pub mod students;
pub mod upload;

pub use health::health_routes;
pub use students::student_routes;
pub use upload::upload_routes;

use crate::ApiError;

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Endpoint not found".to_string())
}
