//! Repository for the `documents` table.

use docvault_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{CreateDocument, Document, DocumentFilter, UpdateDocument};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, client_code, category_id, title, description, original_filename, \
                        storage_path, file_size_bytes, mime_type, uploaded_by, deleted_at, \
                        created_at, updated_at";

/// WHERE clause shared by `list` and `count`.
///
/// `$1` client-code scope, `$2` exact client code, `$3` category, `$4` LIKE pattern.
const FILTER: &str = "deleted_at IS NULL
       AND ($1::text[] IS NULL OR client_code = ANY($1))
       AND ($2::text IS NULL OR client_code = $2)
       AND ($3::bigint IS NULL OR category_id = $3)
       AND ($4::text IS NULL OR title ILIKE $4 OR original_filename ILIKE $4)";

/// `$2` is either NULL or the id of a live category, locked against
/// concurrent soft deletes.
const LIVE_CATEGORY: &str = "($2::bigint IS NULL OR EXISTS (
           SELECT 1 FROM categories
           WHERE id = $2 AND deleted_at IS NULL
           FOR SHARE))";

/// Turn a free-text search into an escaped `ILIKE` pattern.
pub(crate) fn like_pattern(search: Option<&str>) -> Option<String> {
    let term = search?.trim();
    if term.is_empty() {
        return None;
    }
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}

/// Provides CRUD operations for documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new document, returning the created row.
    ///
    /// Returns `None` when `category_id` names a missing or soft-deleted
    /// category. The category row is share-locked for the insert, so a
    /// concurrent category delete waits and then detaches the new row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDocument,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents
                (client_code, category_id, title, description, original_filename,
                 storage_path, file_size_bytes, mime_type, uploaded_by)
             SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9
             WHERE {LIVE_CATEGORY}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(&input.client_code)
            .bind(input.category_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.original_filename)
            .bind(&input.storage_path)
            .bind(input.file_size_bytes)
            .bind(&input.mime_type)
            .bind(input.uploaded_by)
            .fetch_optional(pool)
            .await
    }

    /// Find a document by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM documents WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a document by ID, including soft-deleted rows. Used by restore.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List documents matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &DocumentFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE {FILTER}
             ORDER BY created_at DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(&filter.client_codes)
            .bind(&filter.client_code)
            .bind(filter.category_id)
            .bind(like_pattern(filter.search.as_deref()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count documents matching `filter`.
    pub async fn count(pool: &PgPool, filter: &DocumentFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM documents WHERE {FILTER}");
        sqlx::query_scalar(&query)
            .bind(&filter.client_codes)
            .bind(&filter.client_code)
            .bind(filter.category_id)
            .bind(like_pattern(filter.search.as_deref()))
            .fetch_one(pool)
            .await
    }

    /// Update document metadata. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists, or when a
    /// new `category_id` names a missing or soft-deleted category.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDocument,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category_id = CASE WHEN $5 THEN NULL ELSE COALESCE($4, category_id) END
             WHERE id = $1 AND deleted_at IS NULL
               AND ($5 OR $4::bigint IS NULL OR EXISTS (
                   SELECT 1 FROM categories
                   WHERE id = $4 AND deleted_at IS NULL
                   FOR SHARE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.category_id)
            .bind(input.clear_category)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a document by ID. Returns `true` if a row was marked deleted.
    ///
    /// The stored file is kept so the row can be restored.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE documents SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted document. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE documents SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
