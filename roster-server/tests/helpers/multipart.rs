//! Hand-built multipart/form-data requests

use axum::body::Body;
use axum::http::Request;

pub const UPLOAD_BOUNDARY: &str = "roster-test-boundary";

/// POST /api/upload/excel with one file part
pub fn multipart_request(field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", UPLOAD_BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", UPLOAD_BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload/excel")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", UPLOAD_BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
