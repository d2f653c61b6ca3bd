//! Handlers for the `/documents` resource.
//!
//! Reads are open to every role within its client scope. Uploads, edits and
//! deletes need `staff` or `admin`; restore needs `admin`.

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use docvault_core::documents::{
    content_disposition, resolve_title, storage_key, validate_description, validate_pdf_upload,
    validate_title, PDF_MIME_TYPE,
};
use docvault_core::error::CoreError;
use docvault_core::pagination::{clamp_limit, clamp_offset, Page, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use docvault_core::storage::StorageError;
use docvault_core::types::DbId;
use docvault_db::models::document::{CreateDocument, Document, DocumentFilter, UpdateDocument};
use docvault_db::repositories::{CategoryRepo, ClientRepo, DocumentRepo};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use uuid::Uuid;
use validator::Validate;

use super::multipart::{multipart_error, parse_id, read_file, read_text, UploadedFile};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::middleware::scope::ScopedUser;
use crate::query::DocumentListParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::validation::not_blank;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `PUT /documents/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDocumentRequest {
    #[validate(length(min = 1, max = 255), custom(function = "not_blank"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    /// Detach the document from its category.
    #[serde(default)]
    pub clear_category: bool,
}

/// Metadata for a PDF about to be stored as a document.
pub(crate) struct NewDocument {
    pub client_code: String,
    pub category_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub file: UploadedFile,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Document",
        id,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/documents
///
/// Paginated list of live documents whose client is visible to the caller.
pub async fn list_documents(
    State(state): State<AppState>,
    user: ScopedUser,
    Query(params): Query<DocumentListParams>,
) -> AppResult<Json<DataResponse<Page<Document>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let client_codes = ClientRepo::accessible_codes(&state.legacy_pool, &user.scope).await?;
    let filter = DocumentFilter {
        client_codes,
        client_code: params.client_code,
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

/// POST /api/v1/documents
///
/// Multipart upload. Fields: `file` (required PDF), `client_code`
/// (required), `title`, `description`, `category_id`.
pub async fn upload_document(
    State(state): State<AppState>,
    user: ScopedUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Document>>)> {
    user.ensure_can_write()?;

    let mut file: Option<UploadedFile> = None;
    let mut client_code: Option<String> = None;
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut category_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => file = Some(read_file(field, "document.pdf").await?),
            "client_code" => client_code = read_text(field).await?,
            "title" => title = read_text(field).await?,
            "description" => description = read_text(field).await?,
            "category_id" => category_id = read_text(field).await?,
            _ => {}
        }
    }

    let file = file.ok_or_else(|| {
        AppError::Core(CoreError::Validation("A PDF file is required".into()))
    })?;
    let client_code = client_code.ok_or_else(|| {
        AppError::Core(CoreError::Validation("client_code is required".into()))
    })?;
    let category_id = parse_id("category_id", category_id)?;

    validate_pdf_upload(&file.filename, &file.data, state.config.storage.max_upload_bytes)?;
    let title = resolve_title(title.as_deref(), &file.filename)?;
    validate_description(description.as_deref())?;
    let client_code = resolve_target_client(&state, &user, &client_code).await?;
    ensure_category_exists(&state, category_id).await?;

    let document = store_document(
        &state,
        &user,
        NewDocument {
            client_code,
            category_id,
            title,
            description,
            file,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: document })))
}

/// GET /api/v1/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    user: ScopedUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Document>>> {
    let document = find_accessible(&state, &user, id).await?;
    Ok(Json(DataResponse { data: document }))
}

/// PUT /api/v1/documents/{id}
///
/// Update title, description or category. `clear_category: true` detaches
/// the document from its category.
pub async fn update_document(
    State(state): State<AppState>,
    user: ScopedUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDocumentRequest>,
) -> AppResult<Json<DataResponse<Document>>> {
    user.ensure_can_write()?;
    input.validate()?;
    find_accessible(&state, &user, id).await?;

    if !input.clear_category {
        ensure_category_exists(&state, input.category_id).await?;
    }

    let dto = UpdateDocument {
        title: input.title,
        description: input.description.map(|d| d.trim().to_string()),
        category_id: input.category_id,
        clear_category: input.clear_category,
    };
    let Some(document) = DocumentRepo::update(&state.pool, id, &dto).await? else {
        // The category may have been deleted since the check above.
        if !dto.clear_category {
            ensure_category_exists(&state, dto.category_id).await?;
        }
        return Err(not_found(id));
    };

    tracing::info!(document_id = id, user_id = user.user_id(), "Document updated");
    Ok(Json(DataResponse { data: document }))
}

/// DELETE /api/v1/documents/{id}
///
/// Soft delete. The stored file is kept so the document can be restored.
pub async fn delete_document(
    State(state): State<AppState>,
    user: ScopedUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    user.ensure_can_write()?;
    find_accessible(&state, &user, id).await?;

    if !DocumentRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(document_id = id, user_id = user.user_id(), "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/documents/{id}/restore
///
/// Undo a soft delete. Returns 409 when the document is not deleted.
pub async fn restore_document(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Document>>> {
    DocumentRepo::find_by_id_include_deleted(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if !DocumentRepo::restore(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Document {id} is not deleted"
        ))));
    }

    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(document_id = id, user_id = admin.user_id, "Document restored");
    Ok(Json(DataResponse { data: document }))
}

/// GET /api/v1/documents/{id}/download
///
/// Streams the stored PDF with `Content-Disposition: attachment`.
pub async fn download_document(
    State(state): State<AppState>,
    user: ScopedUser,
    Path(id): Path<DbId>,
) -> AppResult<Response> {
    let document = find_accessible(&state, &user, id).await?;
    let body = open_body(&state, &document.storage_path).await?;

    let disposition = HeaderValue::from_str(&content_disposition(&document.title))
        .map_err(|e| AppError::InternalError(format!("Invalid Content-Disposition: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PDF_MIME_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a live document and check the caller may see its client.
async fn find_accessible(state: &AppState, user: &ScopedUser, id: DbId) -> AppResult<Document> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    user.ensure_document_access(state, &document.client_code)
        .await?;
    Ok(document)
}

/// Check the client a new document is filed under. Unknown codes are a
/// validation failure, out-of-scope codes are 403.
pub(crate) async fn resolve_target_client(
    state: &AppState,
    user: &ScopedUser,
    code: &str,
) -> AppResult<String> {
    match user.accessible_client(state, code).await {
        Ok(client) => Ok(client.code),
        Err(AppError::Core(CoreError::NotFoundByKey { .. })) => Err(AppError::Core(
            CoreError::Validation(format!("Unknown client '{code}'")),
        )),
        Err(e) => Err(e),
    }
}

/// A category referenced by a document must exist and not be deleted.
pub(crate) async fn ensure_category_exists(
    state: &AppState,
    category_id: Option<DbId>,
) -> AppResult<()> {
    let Some(id) = category_id else {
        return Ok(());
    };
    if CategoryRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(missing_category(Some(id)));
    }
    Ok(())
}

fn missing_category(id: Option<DbId>) -> AppError {
    let id = id.map(|id| id.to_string()).unwrap_or_default();
    AppError::Core(CoreError::Validation(format!("Category {id} does not exist")))
}

async fn remove_orphan(state: &AppState, key: &str) {
    if let Err(e) = state.storage.delete(key).await {
        tracing::error!(key = %key, error = %e, "Failed to remove orphaned file");
    }
}

/// Write the PDF to storage and insert its row.
///
/// When the insert fails the stored file is removed again.
pub(crate) async fn store_document(
    state: &AppState,
    user: &ScopedUser,
    new: NewDocument,
) -> AppResult<Document> {
    validate_title(&new.title)?;
    let key = storage_key(&new.client_code, Uuid::new_v4());
    state.storage.put(&key, &new.file.data).await?;

    let input = CreateDocument {
        client_code: new.client_code,
        category_id: new.category_id,
        title: new.title,
        description: new.description,
        original_filename: new.file.filename,
        storage_path: key.clone(),
        file_size_bytes: new.file.data.len() as i64,
        mime_type: PDF_MIME_TYPE.to_string(),
        uploaded_by: Some(user.user_id()),
    };

    let category_id = input.category_id;
    match DocumentRepo::create(&state.pool, &input).await {
        Ok(Some(document)) => {
            tracing::info!(
                document_id = document.id,
                client_code = %document.client_code,
                size_bytes = document.file_size_bytes,
                user_id = user.user_id(),
                "Document stored"
            );
            Ok(document)
        }
        Ok(None) => {
            remove_orphan(state, &key).await;
            Err(missing_category(category_id))
        }
        Err(err) => {
            remove_orphan(state, &key).await;
            Err(err.into())
        }
    }
}

/// Stream from the local file when the disk is file-backed, otherwise buffer.
async fn open_body(state: &AppState, key: &str) -> AppResult<Body> {
    if let Some(path) = state.storage.local_path(key) {
        return match tokio::fs::File::open(&path).await {
            Ok(file) => Ok(Body::from_stream(ReaderStream::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::error!(key = %key, "Stored file missing for document");
                Err(StorageError::NotFound(key.to_string()).into())
            }
            Err(e) => Err(StorageError::Io(e).into()),
        };
    }
    let data = state.storage.get(key).await?;
    Ok(Body::from(data))
}
