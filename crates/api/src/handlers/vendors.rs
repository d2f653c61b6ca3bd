//! Handlers for the `/vendors` resource (admin only).

use axum::extract::State;
use axum::Json;
use docvault_db::models::legacy::Vendor;
use docvault_db::repositories::VendorRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/vendors
///
/// All legacy vendors, used when assigning a vendor code to a user.
pub async fn list_vendors(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Vendor>>>> {
    let vendors = VendorRepo::list(&state.legacy_pool).await?;
    Ok(Json(DataResponse { data: vendors }))
}
