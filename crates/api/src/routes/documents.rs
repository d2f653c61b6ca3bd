//! Route definitions for the `/documents` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// ```text
/// GET    /                -> list_documents
/// POST   /                -> upload_document (multipart)
/// GET    /{id}            -> get_document
/// PUT    /{id}            -> update_document
/// DELETE /{id}            -> delete_document
/// GET    /{id}/download   -> download_document
/// POST   /{id}/restore    -> restore_document (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(documents::list_documents).post(documents::upload_document),
        )
        .route(
            "/{id}",
            get(documents::get_document)
                .put(documents::update_document)
                .delete(documents::delete_document),
        )
        .route("/{id}/download", get(documents::download_document))
        .route("/{id}/restore", post(documents::restore_document))
}
