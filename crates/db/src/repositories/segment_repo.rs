//! Repository for the legacy `segments` table.

use sqlx::PgPool;

use crate::models::legacy::Segment;

/// Read access to legacy segments.
pub struct SegmentRepo;

impl SegmentRepo {
    /// All segments ordered by code.
    pub async fn list(legacy: &PgPool) -> Result<Vec<Segment>, sqlx::Error> {
        sqlx::query_as::<_, Segment>(
            "SELECT code, COALESCE(description, '') AS description
             FROM segments
             ORDER BY code",
        )
        .fetch_all(legacy)
        .await
    }
}
