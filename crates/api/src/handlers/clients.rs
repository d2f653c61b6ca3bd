//! Handlers for the `/clients` resource.
//!
//! Clients are read from the legacy database and always narrowed by the
//! caller's [`ClientScope`](docvault_core::access::ClientScope).

use axum::extract::{Path, Query, State};
use axum::Json;
use docvault_core::pagination::{clamp_limit, clamp_offset, Page, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use docvault_db::models::document::{Document, DocumentFilter};
use docvault_db::models::legacy::Client;
use docvault_db::repositories::{ClientRepo, DocumentRepo};

use crate::error::AppResult;
use crate::middleware::scope::ScopedUser;
use crate::query::{ClientListParams, DocumentListParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/clients
///
/// Paginated list of the clients visible to the caller, searchable by name,
/// code or tax id.
pub async fn list_clients(
    State(state): State<AppState>,
    user: ScopedUser,
    Query(params): Query<ClientListParams>,
) -> AppResult<Json<DataResponse<Page<Client>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);
    let search = params.search.as_deref();

    let items =
        ClientRepo::list_accessible(&state.legacy_pool, &user.scope, search, limit, offset).await?;
    let total_count = ClientRepo::count_accessible(&state.legacy_pool, &user.scope, search).await?;

    Ok(Json(DataResponse {
        data: Page {
            items,
            total_count,
            limit,
            offset,
        },
    }))
}

/// GET /api/v1/clients/{code}
pub async fn get_client(
    State(state): State<AppState>,
    user: ScopedUser,
    Path(code): Path<String>,
) -> AppResult<Json<DataResponse<Client>>> {
    let client = user.accessible_client(&state, &code).await?;
    Ok(Json(DataResponse { data: client }))
}

/// GET /api/v1/clients/{code}/documents
///
/// Documents filed under one client. Accepts the same filters as
/// `GET /documents` except `client_code`, which comes from the path.
pub async fn list_client_documents(
    State(state): State<AppState>,
    user: ScopedUser,
    Path(code): Path<String>,
    Query(params): Query<DocumentListParams>,
) -> AppResult<Json<DataResponse<Page<Document>>>> {
    let client = user.accessible_client(&state, &code).await?;

    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);
    let filter = DocumentFilter {
        client_codes: None,
        client_code: Some(client.code),
        category_id: params.category_id,
        search: params.search,
    };

    let items = DocumentRepo::list(&state.pool, &filter, limit, offset).await?;
    let total_count = DocumentRepo::count(&state.pool, &filter).await?;

    Ok(Json(DataResponse {
        data: Page {
            items,
            total_count,
            limit,
            offset,
        },
    }))
}
