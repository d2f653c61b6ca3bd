//! Client-scope extractor.
//!
//! Loads the caller's role, vendor code and zones from the database rather
//! than the token, so admin changes apply immediately, and resolves the
//! [`ClientScope`] against the legacy segment table.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use docvault_core::access::{ClientScope, SegmentRef};
use docvault_core::error::CoreError;
use docvault_core::roles::{ROLE_ADMIN, ROLE_STAFF};
use docvault_core::types::DbId;
use docvault_db::models::legacy::Client;
use docvault_db::repositories::{ClientRepo, RoleRepo, SegmentRepo, UserRepo};

use super::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// An authenticated, active user together with their client scope.
///
/// `auth.role` holds the role currently stored for the user, which may
/// differ from the role the access token was issued with.
#[derive(Debug, Clone)]
pub struct ScopedUser {
    pub auth: AuthUser,
    pub scope: ClientScope,
}

impl ScopedUser {
    pub fn user_id(&self) -> DbId {
        self.auth.user_id
    }

    /// Vendors are read-only; only staff and admins change documents.
    pub fn ensure_can_write(&self) -> AppResult<()> {
        if self.auth.role == ROLE_ADMIN || self.auth.role == ROLE_STAFF {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(
                "Staff or Admin role required".into(),
            )))
        }
    }

    /// Load a legacy client and check it is inside this user's scope.
    ///
    /// Unknown codes are 404; known clients outside the scope are 403.
    pub async fn accessible_client(&self, state: &AppState, code: &str) -> AppResult<Client> {
        let client = ClientRepo::find_by_code(&state.legacy_pool, code)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFoundByKey {
                    entity: "Client",
                    key: code.to_string(),
                })
            })?;

        if !self
            .scope
            .permits(client.vendor_code.as_deref(), client.segment_code.as_deref())
        {
            tracing::warn!(
                user_id = self.auth.user_id,
                client_code = %code,
                "Client access denied"
            );
            return Err(AppError::Core(CoreError::Forbidden(
                "You do not have access to this client".into(),
            )));
        }
        Ok(client)
    }

    /// Check access to the client a document belongs to.
    ///
    /// Admins pass without a legacy lookup, so documents of clients that have
    /// since vanished from the legacy database stay reachable for them.
    pub async fn ensure_document_access(&self, state: &AppState, client_code: &str) -> AppResult<()> {
        if self.scope == ClientScope::Unrestricted {
            return Ok(());
        }
        match self.accessible_client(state, client_code).await {
            Ok(_) => Ok(()),
            Err(AppError::Core(CoreError::NotFoundByKey { .. })) => Err(AppError::Core(
                CoreError::Forbidden("You do not have access to this client".into()),
            )),
            Err(e) => Err(e),
        }
    }
}

impl FromRequestParts<AppState> for ScopedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token_user = AuthUser::from_request_parts(parts, state).await?;

        let user = UserRepo::find_by_id(&state.pool, token_user.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Account is no longer active".into()))
            })?;

        let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
        if role != token_user.role {
            tracing::debug!(
                user_id = user.id,
                token_role = %token_user.role,
                role = %role,
                "Role changed since token was issued"
            );
        }
        let auth = AuthUser {
            user_id: user.id,
            role,
        };

        let segments: Vec<SegmentRef> = if ClientScope::needs_segments(&auth.role) {
            SegmentRepo::list(&state.legacy_pool)
                .await?
                .into_iter()
                .map(SegmentRef::from)
                .collect()
        } else {
            Vec::new()
        };

        let scope = ClientScope::for_user(
            &auth.role,
            user.vendor_code.as_deref(),
            &user.zones,
            &segments,
        );

        Ok(ScopedUser { auth, scope })
    }
}
