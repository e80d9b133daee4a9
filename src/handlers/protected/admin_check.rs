// handlers/protected/admin_check.rs - GET /api/admin/check handler

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::AuthenticatedIdentity;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCheckResponse {
    pub is_admin: bool,
}

/// GET /api/admin/check - Whether the caller holds admin privileges
///
/// Any verified identity may ask; the answer is a boolean rather than a 403.
pub async fn admin_check(
    State(state): State<AppState>,
    Extension(AuthenticatedIdentity(identity)): Extension<AuthenticatedIdentity>,
) -> Json<AdminCheckResponse> {
    Json(AdminCheckResponse {
        is_admin: state.gate.is_admin(&identity),
    })
}
