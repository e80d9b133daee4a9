// handlers/elevated/admin/list.rs - GET /api/admin/list handler

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::admin::AdminRecord;
use crate::auth::AdminCaller;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AdminListResponse {
    pub admins: Vec<AdminRecord>,
}

/// GET /api/admin/list - All admins in insertion order
pub async fn admin_list(
    State(state): State<AppState>,
    Extension(_caller): Extension<AdminCaller>,
) -> Json<AdminListResponse> {
    Json(AdminListResponse {
        admins: state.admins.list(),
    })
}
