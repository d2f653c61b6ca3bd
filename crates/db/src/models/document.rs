//! Document entity model and DTOs.

use docvault_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A document row from the `documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub client_code: String,
    pub category_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub original_filename: String,
    /// Storage key on the file disk. Not exposed to clients.
    #[serde(skip_serializing)]
    pub storage_path: String,
    pub file_size_bytes: i64,
    pub mime_type: String,
    pub uploaded_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a document after its file has been stored.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub client_code: String,
    pub category_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub original_filename: String,
    pub storage_path: String,
    pub file_size_bytes: i64,
    pub mime_type: String,
    pub uploaded_by: Option<DbId>,
}

/// DTO for updating document metadata. All fields are optional.
///
/// Set `clear_category` to detach the document from its category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocument {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    #[serde(default)]
    pub clear_category: bool,
}

/// Filters for listing documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    /// Restrict to these client codes. `None` means no restriction.
    pub client_codes: Option<Vec<String>>,
    pub client_code: Option<String>,
    pub category_id: Option<DbId>,
    /// Case-insensitive substring match on title and original file name.
    pub search: Option<String>,
}
