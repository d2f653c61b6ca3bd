//! Read-only rows from the legacy reference database.

use serde::Serialize;
use sqlx::FromRow;

/// A row from the legacy `segments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Segment {
    pub code: String,
    pub description: String,
}

/// A row from the legacy `vendors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vendor {
    pub code: String,
    pub name: String,
    pub segment_code: Option<String>,
}

/// A legacy client joined with its segment description.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub code: String,
    pub name: String,
    pub tax_id: Option<String>,
    pub vendor_code: Option<String>,
    pub segment_code: Option<String>,
    pub segment_description: Option<String>,
    pub city: Option<String>,
    pub is_active: bool,
}

impl From<Segment> for docvault_core::access::SegmentRef {
    fn from(segment: Segment) -> Self {
        Self {
            code: segment.code,
            description: segment.description,
        }
    }
}
