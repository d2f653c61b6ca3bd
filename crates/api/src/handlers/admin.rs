//! Handlers for the `/admin` resource (user management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use docvault_core::access::normalize_zones;
use docvault_core::error::CoreError;
use docvault_core::roles::ROLE_VENDOR;
use docvault_core::types::DbId;
use docvault_db::models::role::Role;
use docvault_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use docvault_db::repositories::{RoleRepo, SessionRepo, UserRepo, VendorRepo};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::validation::{not_blank, trimmed};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50), custom(function = "not_blank"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    /// Role name: `admin`, `staff` or `vendor`.
    pub role: String,
    /// Required for `vendor` users.
    pub vendor_code: Option<String>,
    #[serde(default)]
    pub zones: Vec<String>,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50), custom(function = "not_blank"))]
    pub username: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    pub role: Option<String>,
    pub vendor_code: Option<String>,
    pub zones: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /admin/users/{id}/reset-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub new_password: String,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users
///
/// Create a user. Vendor users must reference an existing legacy vendor.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.validate()?;

    let role = find_role(&state, &input.role).await?;
    let vendor_code = trimmed(input.vendor_code).filter(|_| role.name == ROLE_VENDOR);
    check_vendor_code(&state, &role.name, vendor_code.as_deref()).await?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let dto = CreateUser {
        username: input.username.trim().to_string(),
        email: input.email.trim().to_string(),
        password_hash: hashed,
        role_id: role.id,
        vendor_code,
        zones: normalize_zones(&input.zones),
    };
    let user = UserRepo::create(&state.pool, &dto).await?;

    tracing::info!(user_id = user.id, role = %role.name, created_by = admin.user_id, "User created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from_user(user, role.name),
        }),
    ))
}

/// GET /api/v1/admin/users
///
/// Active users by username; `?include_inactive=true` adds deactivated ones.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool, params.include_inactive).await?;

    // Pre-fetch all roles to avoid N+1 queries.
    let roles = RoleRepo::list(&state.pool).await?;

    let data = users
        .into_iter()
        .map(|u| {
            let role_name = role_name(&roles, u.role_id);
            UserResponse::from_user(u, role_name)
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: to_response(&state, user).await?,
    }))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update profile, role, vendor code, zones or active flag (not password).
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;

    if id == admin.user_id && input.is_active == Some(false) {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot deactivate your own account".into(),
        )));
    }

    let existing = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let role = match input.role.as_deref() {
        Some(name) => Some(find_role(&state, name).await?),
        None => None,
    };
    let effective_role = match &role {
        Some(r) => r.name.clone(),
        None => RoleRepo::resolve_name(&state.pool, existing.role_id).await?,
    };
    let is_vendor = effective_role == ROLE_VENDOR;
    // Only vendor users carry a vendor code.
    let vendor_code = trimmed(input.vendor_code).filter(|_| is_vendor);
    let effective_vendor = vendor_code.clone().or(existing.vendor_code);
    check_vendor_code(&state, &effective_role, effective_vendor.as_deref()).await?;

    let role_changed = role.as_ref().is_some_and(|r| r.id != existing.role_id);
    let dto = UpdateUser {
        username: input.username.map(|u| u.trim().to_string()),
        email: input.email.map(|e| e.trim().to_string()),
        role_id: role.map(|r| r.id),
        vendor_code,
        clear_vendor_code: !is_vendor,
        zones: input.zones.as_deref().map(normalize_zones),
        is_active: input.is_active,
    };
    let user = UserRepo::update(&state.pool, id, &dto)
        .await?
        .ok_or_else(|| not_found(id))?;

    if !user.is_active || role_changed {
        let revoked = SessionRepo::revoke_all_for_user(&state.pool, id).await?;
        tracing::debug!(user_id = id, revoked, role_changed, "Sessions revoked");
    }

    tracing::info!(user_id = id, updated_by = admin.user_id, "User updated");
    Ok(Json(DataResponse {
        data: UserResponse::from_user(user, effective_role),
    }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivate a user and revoke their sessions. Returns 204 No Content.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot deactivate your own account".into(),
        )));
    }

    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(not_found(id));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    tracing::info!(user_id = id, deactivated_by = admin.user_id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/reset-password
///
/// Set a new password, clear any lockout and revoke the user's sessions.
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    input.validate()?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !UserRepo::update_password(&state.pool, id, &hashed).await? {
        return Err(not_found(id));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    tracing::info!(user_id = id, reset_by = admin.user_id, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_role(state: &AppState, name: &str) -> AppResult<Role> {
    RoleRepo::find_by_name(&state.pool, name.trim())
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Validation(format!("Unknown role '{name}'"))))
}

/// Vendor users need a vendor code that exists in the legacy database.
async fn check_vendor_code(
    state: &AppState,
    role: &str,
    vendor_code: Option<&str>,
) -> AppResult<()> {
    if role != ROLE_VENDOR {
        return Ok(());
    }
    let code = vendor_code.ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "vendor_code is required for vendor users".into(),
        ))
    })?;
    if VendorRepo::find_by_code(&state.legacy_pool, code)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown vendor '{code}'"
        ))));
    }
    Ok(())
}

fn role_name(roles: &[Role], role_id: DbId) -> String {
    roles
        .iter()
        .find(|r| r.id == role_id)
        .map(|r| r.name.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn to_response(state: &AppState, user: User) -> AppResult<UserResponse> {
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(UserResponse::from_user(user, role))
}
