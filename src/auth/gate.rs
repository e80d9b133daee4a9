use std::sync::Arc;
use thiserror::Error;

use super::extract_bearer_token;
use crate::admin::AdminRegistry;
use crate::identity::{IdentityClaim, IdentityError, IdentityProvider};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),
}

/// Caller that passed the gate: verified identity listed in the registry
#[derive(Debug, Clone)]
pub struct AdminCaller {
    pub email: String,
    pub identity: IdentityClaim,
}

/// Terminal state of the gate for one request
#[derive(Debug, Clone)]
pub enum GateOutcome {
    /// No token, or the provider rejected it
    Unauthenticated(String),
    /// Verified identity without admin privilege (or without an email claim)
    Forbidden {
        identity: IdentityClaim,
        reason: String,
    },
    Authorized(AdminCaller),
}

impl GateOutcome {
    pub fn into_result(self) -> Result<AdminCaller, GateError> {
        match self {
            GateOutcome::Unauthenticated(reason) => Err(GateError::Unauthenticated(reason)),
            GateOutcome::Forbidden { reason, .. } => Err(GateError::Forbidden(reason)),
            GateOutcome::Authorized(caller) => Ok(caller),
        }
    }
}

/// Combines token verification with the admin registry
#[derive(Clone)]
pub struct AuthorizationGate {
    identity: Arc<dyn IdentityProvider>,
    registry: Arc<AdminRegistry>,
}

impl AuthorizationGate {
    pub fn new(identity: Arc<dyn IdentityProvider>, registry: Arc<AdminRegistry>) -> Self {
        Self { identity, registry }
    }

    /// Verify the bearer token carried in an `Authorization` header value
    pub async fn authenticate(&self, header: Option<&str>) -> Result<IdentityClaim, GateError> {
        let token = extract_bearer_token(header)?;

        self.identity.verify_id_token(token).await.map_err(|e| {
            match &e {
                IdentityError::NotConfigured => {
                    tracing::warn!("Rejecting token: identity provider '{}' is not configured", self.identity.name())
                }
                _ => tracing::debug!("Token verification failed: {}", e),
            }
            GateError::Unauthenticated("Invalid token".to_string())
        })
    }

    /// Whether an authenticated identity holds admin privilege. Identities
    /// without an email are never admins.
    pub fn is_admin(&self, identity: &IdentityClaim) -> bool {
        identity
            .email
            .as_deref()
            .map(|email| self.registry.is_admin(email))
            .unwrap_or(false)
    }

    /// Classify an already-verified identity
    pub fn classify(&self, identity: IdentityClaim) -> GateOutcome {
        let Some(email) = identity.email.clone() else {
            return GateOutcome::Forbidden {
                identity,
                reason: "Email not found in token".to_string(),
            };
        };

        if !self.registry.is_admin(&email) {
            tracing::debug!("Caller '{}' is not an admin", email);
            return GateOutcome::Forbidden {
                identity,
                reason: "Admin privileges required".to_string(),
            };
        }

        GateOutcome::Authorized(AdminCaller { email, identity })
    }

    pub async fn evaluate(&self, header: Option<&str>) -> GateOutcome {
        match self.authenticate(header).await {
            Ok(identity) => self.classify(identity),
            Err(GateError::Unauthenticated(reason)) | Err(GateError::Forbidden(reason)) => {
                GateOutcome::Unauthenticated(reason)
            }
        }
    }

    pub async fn authorize(&self, header: Option<&str>) -> Result<AdminCaller, GateError> {
        self.evaluate(header).await.into_result()
    }
}
