use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Admin API (Rust)",
            "version": version,
            "description": "Admin role management backed by Firebase Authentication",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "search": "POST /api/search (public)",
                "admin_check": "GET /api/admin/check (authenticated)",
                "admin_list": "GET /api/admin/list (admin)",
                "admin_add": "POST /api/admin/add (admin)",
                "admin_remove": "POST /api/admin/remove (admin)",
            }
        }
    }))
}

/// GET /health - Liveness plus identity provider status
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let admins = state.registry.len();
    let provider = state.identity.name();

    if state.identity.is_configured() {
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "identity": provider,
                    "admins": admins
                }
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "identity provider not configured",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "identity": provider,
                    "admins": admins
                }
            })),
        )
    }
}
