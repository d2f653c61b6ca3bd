//! Route definitions for the `/pdf-split` tool.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::pdf_split;
use crate::state::AppState;

/// Routes mounted at `/pdf-split`.
///
/// ```text
/// POST   /upload   -> upload_source (multipart)
/// POST   /save     -> save_parts (multipart)
/// GET    /{token}  -> show_source
/// DELETE /{token}  -> discard_source
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(pdf_split::upload_source))
        .route("/save", post(pdf_split::save_parts))
        .route(
            "/{token}",
            get(pdf_split::show_source).delete(pdf_split::discard_source),
        )
}
