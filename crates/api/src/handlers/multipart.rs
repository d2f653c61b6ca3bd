//! Small helpers for reading `multipart/form-data` bodies.

use axum::extract::multipart::{Field, MultipartError};
use docvault_core::error::CoreError;
use docvault_core::types::DbId;

use crate::error::AppError;

/// A file part read fully into memory.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

pub fn multipart_error(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {err}"))
}

/// Read a file field. A missing file name falls back to `default_name`.
pub async fn read_file(field: Field<'_>, default_name: &str) -> Result<UploadedFile, AppError> {
    let filename = field
        .file_name()
        .map(str::to_string)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| default_name.to_string());
    let data = field.bytes().await.map_err(multipart_error)?;
    Ok(UploadedFile {
        filename,
        data: data.to_vec(),
    })
}

/// Read a text field, trimmed. Blank values become `None`.
pub async fn read_text(field: Field<'_>) -> Result<Option<String>, AppError> {
    let text = field.text().await.map_err(multipart_error)?;
    let text = text.trim();
    Ok(if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    })
}

/// Parse an optional numeric id sent as a form field.
pub fn parse_id(field: &str, value: Option<String>) -> Result<Option<DbId>, AppError> {
    value
        .map(|v| {
            v.parse::<DbId>().map_err(|_| {
                AppError::Core(CoreError::Validation(format!(
                    "{field} must be an integer"
                )))
            })
        })
        .transpose()
}
