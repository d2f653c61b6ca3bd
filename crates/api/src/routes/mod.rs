pub mod admin;
pub mod auth;
pub mod categories;
pub mod clients;
pub mod documents;
pub mod health;
pub mod pdf_split;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                login (public)
/// /auth/refresh                              refresh (public)
/// /auth/logout                               logout (requires auth)
/// /auth/me                                   current user (requires auth)
///
/// /clients                                   scoped list (?search, limit, offset)
/// /clients/{code}                            get
/// /clients/{code}/documents                  documents of one client
///
/// /vendors                                   list (admin only)
///
/// /categories                                list, create (create: admin)
/// /categories/{id}                           get, update, delete (writes: admin)
///
/// /documents                                 scoped list, upload (multipart)
/// /documents/{id}                            get, update, delete
/// /documents/{id}/download                   PDF stream
/// /documents/{id}/restore                    undo soft delete (admin)
///
/// /pdf-split/upload                          temp upload (multipart)
/// /pdf-split/save                            store parts (multipart)
/// /pdf-split/{token}                         serve, discard
///
/// /admin/users                               list, create (admin only)
/// /admin/users/{id}                          get, update, deactivate
/// /admin/users/{id}/reset-password           reset password
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/clients", clients::router())
        .route("/vendors", get(handlers::vendors::list_vendors))
        .nest("/categories", categories::router())
        .nest("/documents", documents::router())
        .nest("/pdf-split", pdf_split::router())
        .nest("/admin", admin::router())
}
