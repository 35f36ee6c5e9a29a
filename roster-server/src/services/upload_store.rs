//! Temporary storage for uploaded spreadsheets
//!
//! Uploads land in the uploads folder as `<uuid>-<sanitized name>` and are
//! removed by the import driver once the import finishes.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Extensions the upload endpoint accepts, lowercase
pub const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// A spreadsheet written to the uploads folder
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub path: PathBuf,
    /// Name the client sent
    pub original_name: String,
}

impl UploadedFile {
    /// Name of the stored file within the uploads folder
    pub fn stored_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

pub fn has_allowed_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client file name to a safe single path component
///
/// Directory parts are dropped and anything other than ASCII letters,
/// digits, `.`, `-` and `_` becomes `_`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Write upload bytes to a fresh file in `uploads_dir`
pub async fn store_upload(
    uploads_dir: &Path,
    original_name: &str,
    bytes: &[u8],
) -> std::io::Result<UploadedFile> {
    tokio::fs::create_dir_all(uploads_dir).await?;

    let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(original_name));
    let path = uploads_dir.join(stored_name);
    tokio::fs::write(&path, bytes).await?;

    Ok(UploadedFile {
        path,
        original_name: original_name.to_string(),
    })
}
