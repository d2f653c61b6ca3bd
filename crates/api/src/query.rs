//! Shared query parameter types for API handlers.

use docvault_core::types::DbId;
use serde::Deserialize;

/// Query parameters for `GET /clients`.
#[derive(Debug, Default, Deserialize)]
pub struct ClientListParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for document list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentListParams {
    pub client_code: Option<String>,
    pub category_id: Option<DbId>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for list endpoints that support an `include_inactive` flag.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}
