pub mod gate;

pub use gate::{AdminCaller, AuthorizationGate, GateError, GateOutcome};

/// Pull the bearer token out of an `Authorization` header value.
///
/// A `Bearer ` prefix is stripped when present; any other value is taken as the
/// token itself. Blank tokens are rejected.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, GateError> {
    let value = header.ok_or_else(|| GateError::Unauthenticated("Authorization header required".to_string()))?;

    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        return Err(GateError::Unauthenticated("Empty bearer token".to_string()));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            extract_bearer_token(None),
            Err(GateError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_bearer_prefix_stripped() {
        assert_eq!(extract_bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn test_raw_token_accepted() {
        assert_eq!(extract_bearer_token(Some("abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn test_blank_token_rejected() {
        assert!(extract_bearer_token(Some("Bearer   ")).is_err());
        assert!(extract_bearer_token(Some("")).is_err());
    }
}
