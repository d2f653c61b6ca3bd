//! Repository for the legacy `clients` table.
//!
//! Every list query is narrowed by a [`ClientScope`]: vendor users match on
//! `vendor_code`, zone-scoped users on `segment_code`, admins see all rows.

use docvault_core::access::ClientScope;
use sqlx::PgPool;

use crate::models::legacy::Client;
use crate::repositories::document_repo::like_pattern;

const SELECT: &str = "SELECT c.code, c.name, c.tax_id, c.vendor_code, c.segment_code,
                             s.description AS segment_description, c.city, c.is_active
                      FROM clients c
                      LEFT JOIN segments s ON s.code = c.segment_code";

/// `$1` vendor code, `$2` segment codes, `$3` LIKE pattern.
const FILTER: &str = "($1::text IS NULL OR c.vendor_code = $1)
       AND ($2::text[] IS NULL OR c.segment_code = ANY($2))
       AND ($3::text IS NULL OR c.name ILIKE $3 OR c.code ILIKE $3 OR c.tax_id ILIKE $3)";

/// Split a scope into the two nullable bind parameters used by [`FILTER`].
fn scope_binds(scope: &ClientScope) -> (Option<String>, Option<Vec<String>>) {
    match scope {
        ClientScope::Unrestricted => (None, None),
        ClientScope::Vendor(code) => (Some(code.clone()), None),
        ClientScope::Segments(codes) => (None, Some(codes.clone())),
    }
}

/// Read access to legacy clients.
pub struct ClientRepo;

impl ClientRepo {
    /// List clients visible under `scope`, ordered by name.
    pub async fn list_accessible(
        legacy: &PgPool,
        scope: &ClientScope,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Client>, sqlx::Error> {
        let (vendor, segments) = scope_binds(scope);
        let query = format!(
            "{SELECT}
             WHERE {FILTER}
             ORDER BY c.name, c.code
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(vendor)
            .bind(segments)
            .bind(like_pattern(search))
            .bind(limit)
            .bind(offset)
            .fetch_all(legacy)
            .await
    }

    /// Count clients visible under `scope`.
    pub async fn count_accessible(
        legacy: &PgPool,
        scope: &ClientScope,
        search: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let (vendor, segments) = scope_binds(scope);
        let query = format!("SELECT COUNT(*) FROM clients c WHERE {FILTER}");
        sqlx::query_scalar(&query)
            .bind(vendor)
            .bind(segments)
            .bind(like_pattern(search))
            .fetch_one(legacy)
            .await
    }

    /// Codes of every client visible under `scope`.
    ///
    /// Returns `None` for an unrestricted scope so callers can skip filtering.
    pub async fn accessible_codes(
        legacy: &PgPool,
        scope: &ClientScope,
    ) -> Result<Option<Vec<String>>, sqlx::Error> {
        if *scope == ClientScope::Unrestricted {
            return Ok(None);
        }
        let (vendor, segments) = scope_binds(scope);
        let query = format!("SELECT c.code FROM clients c WHERE {FILTER}");
        let codes: Vec<String> = sqlx::query_scalar(&query)
            .bind(vendor)
            .bind(segments)
            .bind(None::<String>)
            .fetch_all(legacy)
            .await?;
        Ok(Some(codes))
    }

    /// Find a client by code, regardless of scope.
    pub async fn find_by_code(legacy: &PgPool, code: &str) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("{SELECT} WHERE c.code = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(code)
            .fetch_optional(legacy)
            .await
    }
}
