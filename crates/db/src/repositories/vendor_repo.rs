//! Repository for the legacy `vendors` table.

use sqlx::PgPool;

use crate::models::legacy::Vendor;

const COLUMNS: &str = "code, name, segment_code";

/// Read access to legacy vendors.
pub struct VendorRepo;

impl VendorRepo {
    /// All vendors ordered by name.
    pub async fn list(legacy: &PgPool) -> Result<Vec<Vendor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vendors ORDER BY name, code");
        sqlx::query_as::<_, Vendor>(&query).fetch_all(legacy).await
    }

    /// Find a vendor by its code.
    pub async fn find_by_code(legacy: &PgPool, code: &str) -> Result<Option<Vendor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vendors WHERE code = $1");
        sqlx::query_as::<_, Vendor>(&query)
            .bind(code)
            .fetch_optional(legacy)
            .await
    }
}
