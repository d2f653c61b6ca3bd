//! Handlers for the `/pdf-split` tool.
//!
//! The browser does the splitting. The server keeps the source PDF under a
//! temporary key, serves it back, stores the resulting parts as documents and
//! deletes the temporary file. Every upload first purges temp files older
//! than the configured TTL.

use std::collections::BTreeMap;

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use docvault_core::documents::{
    resolve_title, validate_description, validate_pdf_upload, PDF_MIME_TYPE,
};
use docvault_core::error::CoreError;
use docvault_core::pdf_split::{
    is_stale, parse_token, part_index, temp_key, title_index, validate_part_count, TEMP_PREFIX,
};
use docvault_core::storage::StorageDisk;
use docvault_core::types::Timestamp;
use docvault_db::models::document::Document;
use serde::Serialize;
use uuid::Uuid;

use super::documents::{ensure_category_exists, resolve_target_client, store_document, NewDocument};
use super::multipart::{multipart_error, parse_id, read_file, read_text, UploadedFile};
use crate::error::{AppError, AppResult};
use crate::middleware::scope::ScopedUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for a temp upload.
#[derive(Debug, Serialize)]
pub struct SplitUpload {
    pub token: Uuid,
    pub filename: String,
    pub size_bytes: usize,
    /// Where the client fetches the PDF back from.
    pub url: String,
}

/// POST /api/v1/pdf-split/upload
///
/// Multipart field `file`. Stores the PDF under a fresh token.
pub async fn upload_source(
    State(state): State<AppState>,
    user: ScopedUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<SplitUpload>>)> {
    user.ensure_can_write()?;
    purge_stale_temp_files(
        state.storage.as_ref(),
        state.config.storage.split_temp_ttl(),
        Utc::now(),
    )
    .await;

    let mut file: Option<UploadedFile> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            file = Some(read_file(field, "source.pdf").await?);
        }
    }
    let file = file.ok_or_else(|| {
        AppError::Core(CoreError::Validation("A PDF file is required".into()))
    })?;
    validate_pdf_upload(&file.filename, &file.data, state.config.storage.max_upload_bytes)?;

    let token = Uuid::new_v4();
    state.storage.put(&temp_key(token), &file.data).await?;
    tracing::info!(%token, size_bytes = file.data.len(), user_id = user.user_id(), "Split source uploaded");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SplitUpload {
                token,
                filename: file.filename,
                size_bytes: file.data.len(),
                url: format!("/api/v1/pdf-split/{token}"),
            },
        }),
    ))
}

/// GET /api/v1/pdf-split/{token}
///
/// Serve the temporary PDF back to the browser.
pub async fn show_source(
    State(state): State<AppState>,
    user: ScopedUser,
    Path(token): Path<String>,
) -> AppResult<Response> {
    user.ensure_can_write()?;
    let token = parse_token(&token)?;
    let data = state.storage.get(&temp_key(token)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PDF_MIME_TYPE)),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        Body::from(data),
    )
        .into_response())
}

/// POST /api/v1/pdf-split/save
///
/// Multipart fields: `token`, `client_code`, optional `category_id` and
/// `description`, then `parts[i]` (PDF files) with matching `titles[i]`.
/// Every part is validated before anything is stored, and the token must
/// name a temporary source that still exists. The source is deleted once the
/// parts are saved.
pub async fn save_parts(
    State(state): State<AppState>,
    user: ScopedUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<Document>>>)> {
    user.ensure_can_write()?;

    let mut token: Option<String> = None;
    let mut client_code: Option<String> = None;
    let mut category_id: Option<String> = None;
    let mut description: Option<String> = None;
    let mut parts: BTreeMap<usize, UploadedFile> = BTreeMap::new();
    let mut titles: BTreeMap<usize, String> = BTreeMap::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        if let Some(index) = part_index(&name) {
            let fallback = format!("part-{}.pdf", index + 1);
            parts.insert(index, read_file(field, &fallback).await?);
            continue;
        }
        if let Some(index) = title_index(&name) {
            if let Some(title) = read_text(field).await? {
                titles.insert(index, title);
            }
            continue;
        }
        match name.as_str() {
            "token" => token = read_text(field).await?,
            "client_code" => client_code = read_text(field).await?,
            "category_id" => category_id = read_text(field).await?,
            "description" => description = read_text(field).await?,
            _ => {}
        }
    }

    let token = token.ok_or_else(|| {
        AppError::Core(CoreError::Validation("token is required".into()))
    })?;
    let token = parse_token(&token)?;
    let client_code = client_code.ok_or_else(|| {
        AppError::Core(CoreError::Validation("client_code is required".into()))
    })?;
    let category_id = parse_id("category_id", category_id)?;

    validate_part_count(parts.len())?;
    let max_bytes = state.config.storage.max_upload_bytes;
    let mut pending = Vec::with_capacity(parts.len());
    for (index, file) in parts {
        validate_pdf_upload(&file.filename, &file.data, max_bytes)
            .map_err(|e| for_part(index, e))?;
        let title = resolve_title(titles.get(&index).map(String::as_str), &file.filename)
            .map_err(|e| for_part(index, e))?;
        pending.push((title, file));
    }

    validate_description(description.as_deref())?;
    let client_code = resolve_target_client(&state, &user, &client_code).await?;
    ensure_category_exists(&state, category_id).await?;

    if !state.storage.exists(&temp_key(token)).await? {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "Split source",
            key: token.to_string(),
        }));
    }

    let mut saved = Vec::with_capacity(pending.len());
    for (title, file) in pending {
        let document = store_document(
            &state,
            &user,
            NewDocument {
                client_code: client_code.clone(),
                category_id,
                title,
                description: description.clone(),
                file,
            },
        )
        .await?;
        saved.push(document);
    }

    remove_temp(state.storage.as_ref(), token).await;
    tracing::info!(%token, parts = saved.len(), client_code = %client_code, "Split parts saved");

    Ok((StatusCode::CREATED, Json(DataResponse { data: saved })))
}

/// DELETE /api/v1/pdf-split/{token}
///
/// Drop a temporary source. Idempotent: returns 204 whether or not the file
/// was still there.
pub async fn discard_source(
    State(state): State<AppState>,
    user: ScopedUser,
    Path(token): Path<String>,
) -> AppResult<StatusCode> {
    user.ensure_can_write()?;
    let token = parse_token(&token)?;
    state.storage.delete(&temp_key(token)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Delete temp files older than `ttl`. Returns how many were removed.
///
/// Listing or deletion failures are logged and skipped.
pub async fn purge_stale_temp_files(
    storage: &dyn StorageDisk,
    ttl: chrono::Duration,
    now: Timestamp,
) -> usize {
    let files = match storage.list(TEMP_PREFIX).await {
        Ok(files) => files,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list split temp files");
            return 0;
        }
    };

    let mut removed = 0;
    for file in files.into_iter().filter(|f| is_stale(f.modified_at, now, ttl)) {
        match storage.delete(&file.key).await {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(e) => tracing::error!(key = %file.key, error = %e, "Failed to purge split temp file"),
        }
    }

    if removed > 0 {
        tracing::info!(removed, "Purged stale split temp files");
    }
    removed
}

/// Prefix a validation message with the 1-based part number.
fn for_part(index: usize, err: CoreError) -> AppError {
    match err {
        CoreError::Validation(msg) => {
            AppError::Core(CoreError::Validation(format!("Part {}: {msg}", index + 1)))
        }
        other => AppError::Core(other),
    }
}

async fn remove_temp(storage: &dyn StorageDisk, token: Uuid) {
    if let Err(e) = storage.delete(&temp_key(token)).await {
        tracing::error!(%token, error = %e, "Failed to remove split temp file");
    }
}
