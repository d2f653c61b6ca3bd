//! Temporary-file handling for the PDF splitting tool.
//!
//! The split happens in the browser. The server stores the source PDF under a
//! temporary key, serves it back, and later receives the split parts. Stale
//! temporary files are purged whenever the tool is used.

use chrono::Duration;
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Storage prefix for temporary split sources.
pub const TEMP_PREFIX: &str = "tmp/pdf-split";

/// Default time-to-live for temporary files, in minutes.
pub const DEFAULT_TEMP_TTL_MINS: i64 = 60;

/// Maximum number of parts accepted in one save request.
pub const MAX_PARTS: usize = 100;

/// Parse a client-supplied token. Only UUIDs are accepted.
pub fn parse_token(token: &str) -> Result<Uuid, CoreError> {
    Uuid::parse_str(token.trim())
        .map_err(|_| CoreError::Validation(format!("Invalid split token '{token}'")))
}

/// Storage key of the temporary file for `token`.
pub fn temp_key(token: Uuid) -> String {
    format!("{TEMP_PREFIX}/{token}.pdf")
}

/// Whether a file last modified at `modified` is older than `ttl` at `now`.
pub fn is_stale(modified: Timestamp, now: Timestamp, ttl: Duration) -> bool {
    now.signed_duration_since(modified) > ttl
}

/// Validate the number of parts in a save request.
pub fn validate_part_count(count: usize) -> Result<(), CoreError> {
    if count == 0 {
        return Err(CoreError::Validation(
            "At least one split part is required".into(),
        ));
    }
    if count > MAX_PARTS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_PARTS} split parts can be saved at once"
        )));
    }
    Ok(())
}

/// Parse the index out of a multipart field name like `parts[3]`.
pub fn part_index(field_name: &str) -> Option<usize> {
    field_name
        .strip_prefix("parts[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

/// Parse the index out of a field name like `titles[3]`.
pub fn title_index(field_name: &str) -> Option<usize> {
    field_name
        .strip_prefix("titles[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}
