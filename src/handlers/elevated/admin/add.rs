// handlers/elevated/admin/add.rs - POST /api/admin/add handler

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};

use super::{AdminMutationResponse, AdminRequest};
use crate::auth::AdminCaller;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/admin/add - Grant admin privileges
///
/// Errors:
/// - 400: email missing, or already an admin
/// - 404: no account with that email in the identity provider
///
/// The registry write is authoritative. If mirroring the `admin` custom claim
/// fails the add still succeeds and `claimsMirrored` is false.
pub async fn admin_add(
    State(state): State<AppState>,
    Extension(caller): Extension<AdminCaller>,
    payload: Result<Json<AdminRequest>, JsonRejection>,
) -> ApiResult<Json<AdminMutationResponse>> {
    let Json(request) = payload?;

    let added = state.admins.add_admin(&caller, &request.email).await?;
    tracing::info!("Admin '{}' added by '{}' ({:?})", added.record.email, caller.email, added.outcome);

    Ok(Json(AdminMutationResponse {
        message: "Admin added successfully".to_string(),
        claims_mirrored: added.outcome.mirror_ok(),
    }))
}
