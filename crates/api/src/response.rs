//! Shared response envelope types for API handlers.
//!
//! Single resources and plain lists use a `{ "data": ... }` envelope.
//! Paginated lists use [`docvault_core::pagination::Page`] inside it.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
