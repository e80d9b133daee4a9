pub mod admin;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod services;
pub mod state;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Full HTTP application: public, protected and elevated routes plus global layers
pub fn app(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.config.security);

    Router::new()
        // Public
        .merge(public_routes())
        // Verified identity
        .merge(protected_routes(state.clone()))
        // Admin identity
        .merge(elevated_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/search", post(public::search_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected;

    Router::new()
        .route("/api/admin/check", get(protected::admin_check))
        .route_layer(from_fn_with_state(state, middleware::identity_middleware))
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    use handlers::elevated;

    Router::new()
        .route("/api/admin/list", get(elevated::admin_list))
        .route("/api/admin/add", post(elevated::admin_add))
        .route("/api/admin/remove", post(elevated::admin_remove))
        .route_layer(from_fn_with_state(state, middleware::admin_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin::AdminRegistry;
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Request, StatusCode},
    };
    use config::AppConfig;
    use identity::MemoryIdentityProvider;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<MemoryIdentityProvider>) {
        let provider = Arc::new(MemoryIdentityProvider::new());
        provider.add_user("root@example.com");
        let registry = AdminRegistry::with_bootstrap(["root@example.com"], "system");
        let state = AppState::new(AppConfig::for_tests(), registry, provider.clone());
        (app(state), provider)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_elevated_routes_reject_before_reading_body() {
        let (app, provider) = test_app();
        let token = provider.issue_token("user@example.com");

        let response = app
            .oneshot(
                Request::post("/api/admin/add")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_check_route_uses_identity_tier() {
        let (app, provider) = test_app();
        let token = provider.issue_token("root@example.com");

        let response = app
            .oneshot(
                Request::get("/api/admin/check")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["isAdmin"], true);
    }
}
