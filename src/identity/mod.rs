// identity/mod.rs - External identity provider seam
//
// Bearer tokens are never decoded by handlers directly. Everything that talks to
// the identity provider (token verification, account lookup, custom claims)
// goes through the IdentityProvider trait so the gate and the admin service can
// be driven by Firebase in production and by an in-memory provider in tests.

pub mod credentials;
pub mod disabled;
pub mod firebase;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::config::IdentityConfig;

pub use credentials::ServiceAccount;
pub use disabled::DisabledIdentityProvider;
pub use firebase::FirebaseIdentityProvider;
pub use memory::MemoryIdentityProvider;

/// Verified identity for the current request. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaim {
    pub uid: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    /// Remaining provider-issued claims
    #[serde(default)]
    pub claims: Map<String, Value>,
}

/// Account as known to the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUser {
    pub uid: String,
    pub email: Option<String>,
    #[serde(default)]
    pub custom_claims: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity provider is not configured")]
    NotConfigured,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid credentials: {0}")]
    Credentials(String),

    #[error("Invalid identity provider configuration: {0}")]
    InvalidConfig(String),

    #[error("Identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Identity provider returned {status}: {message}")]
    Upstream { status: u16, message: String },
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short provider name for logs and health output
    fn name(&self) -> &'static str;

    /// Whether the provider can serve requests at all
    fn is_configured(&self) -> bool {
        true
    }

    /// Verify a bearer token and return the identity it carries
    async fn verify_id_token(&self, token: &str) -> Result<IdentityClaim, IdentityError>;

    /// Resolve an account by email; `UserNotFound` when no such account exists
    async fn get_user_by_email(&self, email: &str) -> Result<ProviderUser, IdentityError>;

    /// Replace the custom claims attached to an account
    async fn set_custom_user_claims(
        &self,
        uid: &str,
        claims: Map<String, Value>,
    ) -> Result<(), IdentityError>;
}

/// Build the provider described by configuration.
///
/// Missing or broken credentials never abort startup: the provider degrades to
/// `DisabledIdentityProvider`, which rejects every token.
pub fn from_config(config: &IdentityConfig) -> Arc<dyn IdentityProvider> {
    let account = match ServiceAccount::from_config(config) {
        Ok(Some(account)) => account,
        Ok(None) => {
            tracing::warn!(
                "Identity provider not initialized. Set GOOGLE_APPLICATION_CREDENTIALS_JSON or GOOGLE_APPLICATION_CREDENTIALS."
            );
            return Arc::new(DisabledIdentityProvider);
        }
        Err(e) => {
            tracing::error!("Failed to load service account credentials: {}", e);
            return Arc::new(DisabledIdentityProvider);
        }
    };

    match FirebaseIdentityProvider::new(account, config) {
        Ok(provider) => {
            tracing::info!("Identity provider initialized for project '{}'", provider.project_id());
            Arc::new(provider)
        }
        Err(e) => {
            tracing::error!("Failed to initialize identity provider: {}", e);
            Arc::new(DisabledIdentityProvider)
        }
    }
}
