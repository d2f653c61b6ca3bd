//! Route definitions for the `/clients` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::clients;
use crate::state::AppState;

/// Routes mounted at `/clients`.
///
/// ```text
/// GET /                  -> list_clients
/// GET /{code}            -> get_client
/// GET /{code}/documents  -> list_client_documents
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(clients::list_clients))
        .route("/{code}", get(clients::get_client))
        .route("/{code}/documents", get(clients::list_client_documents))
}
