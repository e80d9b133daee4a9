// handlers/elevated/admin/remove.rs - POST /api/admin/remove handler

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};

use super::{AdminMutationResponse, AdminRequest};
use crate::auth::AdminCaller;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/admin/remove - Revoke admin privileges
///
/// Callers cannot remove themselves (400). Removing an email that is not an
/// admin is reported as success.
pub async fn admin_remove(
    State(state): State<AppState>,
    Extension(caller): Extension<AdminCaller>,
    payload: Result<Json<AdminRequest>, JsonRejection>,
) -> ApiResult<Json<AdminMutationResponse>> {
    let Json(request) = payload?;

    let removed = state.admins.remove_admin(&caller, &request.email).await?;
    tracing::info!(
        "Admin '{}' removed by '{}' (was admin: {}, {:?})",
        request.email.trim(),
        caller.email,
        removed.removed,
        removed.outcome
    );

    Ok(Json(AdminMutationResponse {
        message: "Admin removed successfully".to_string(),
        claims_mirrored: removed.outcome.mirror_ok(),
    }))
}
