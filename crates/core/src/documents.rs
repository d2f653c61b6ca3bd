//! Document upload rules: PDF detection, size limits, titles, storage keys.

use uuid::Uuid;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default maximum upload size (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// MIME type stored for every accepted document.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Every PDF file starts with this header.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Storage prefix for permanent documents.
pub const DOCUMENTS_PREFIX: &str = "documents";

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check that `filename` has a `.pdf` extension (case-insensitive).
pub fn has_pdf_extension(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Check that `data` begins with the PDF magic bytes.
pub fn has_pdf_signature(data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
}

/// Validate an uploaded file: non-empty, within `max_bytes`, a `.pdf` name and
/// PDF content.
pub fn validate_pdf_upload(filename: &str, data: &[u8], max_bytes: usize) -> Result<(), CoreError> {
    if data.is_empty() {
        return Err(CoreError::Validation("Uploaded file is empty".into()));
    }
    if data.len() > max_bytes {
        return Err(CoreError::Validation(format!(
            "Uploaded file exceeds the maximum size of {max_bytes} bytes"
        )));
    }
    if !has_pdf_extension(filename) {
        return Err(CoreError::Validation(format!(
            "File '{filename}' must have a .pdf extension"
        )));
    }
    if !has_pdf_signature(data) {
        return Err(CoreError::Validation(format!(
            "File '{filename}' is not a valid PDF document"
        )));
    }
    Ok(())
}

/// Resolve the title for a document.
///
/// Uses the given title when present, otherwise the file name without its
/// extension. The result is trimmed and must be 1..=255 characters.
pub fn resolve_title(title: Option<&str>, filename: &str) -> Result<String, CoreError> {
    let candidate = match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => std::path::Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .trim()
            .to_string(),
    };

    validate_title(&candidate)?;
    Ok(candidate)
}

/// Validate a document title length.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let len = title.trim().chars().count();
    if len == 0 {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if len > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an optional document description length.
pub fn validate_description(description: Option<&str>) -> Result<(), CoreError> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => Err(CoreError::Validation(
            format!("Description must be at most {MAX_DESCRIPTION_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Storage keys
// ---------------------------------------------------------------------------

/// Reduce a client code to characters that are safe inside a storage key.
pub fn sanitize_key_segment(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Storage key for a permanent document: `documents/{client}/{uuid}.pdf`.
pub fn storage_key(client_code: &str, id: Uuid) -> String {
    format!(
        "{DOCUMENTS_PREFIX}/{}/{id}.pdf",
        sanitize_key_segment(client_code)
    )
}

/// Build a safe `Content-Disposition` filename from a document title.
pub fn download_filename(title: &str) -> String {
    let base: String = title
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' | '\r' | '\n' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let base = base.trim();
    if has_pdf_extension(base) {
        base.to_string()
    } else {
        format!("{base}.pdf")
    }
}

/// `Content-Disposition` value for downloading a document titled `title`.
///
/// Carries an ASCII `filename` fallback plus an RFC 5987 `filename*` so
/// accented titles survive in browsers that support it.
pub fn content_disposition(title: &str) -> String {
    let name = download_filename(title);
    let ascii: String = name
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();

    let mut encoded = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }

    format!("attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}")
}
