use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::identity::IdentityClaim;
use crate::state::AppState;

/// Verified identity of the caller, injected by `identity_middleware`
#[derive(Clone, Debug)]
pub struct AuthenticatedIdentity(pub IdentityClaim);

/// Requires a valid bearer token; the caller need not be an admin
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = authorization_header(request.headers())?;
    let identity = state.gate.authenticate(header.as_deref()).await?;

    request.extensions_mut().insert(AuthenticatedIdentity(identity));
    Ok(next.run(request).await)
}

/// Requires a valid bearer token belonging to a registered admin
pub async fn admin_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = authorization_header(request.headers())?;
    let caller = state.gate.authorize(header.as_deref()).await.map_err(|e| {
        tracing::warn!("Admin gate rejected {} {}: {}", request.method(), request.uri().path(), e);
        e
    })?;

    tracing::debug!("Admin caller '{}' authorized", caller.email);
    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

/// Raw `Authorization` header value, if any
fn authorization_header(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    headers
        .get(AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map(str::to_owned)
                .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_absent_header_is_none() {
        assert_eq!(authorization_header(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn test_header_value_passed_through() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(authorization_header(&headers).unwrap().as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn test_non_ascii_header_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xff").unwrap());
        let err = authorization_header(&headers).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }
}
