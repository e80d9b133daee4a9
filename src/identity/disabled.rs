use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{IdentityClaim, IdentityError, IdentityProvider, ProviderUser};

/// Stand-in used when no credentials are available. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledIdentityProvider;

#[async_trait]
impl IdentityProvider for DisabledIdentityProvider {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn verify_id_token(&self, _token: &str) -> Result<IdentityClaim, IdentityError> {
        Err(IdentityError::NotConfigured)
    }

    async fn get_user_by_email(&self, _email: &str) -> Result<ProviderUser, IdentityError> {
        Err(IdentityError::NotConfigured)
    }

    async fn set_custom_user_claims(
        &self,
        _uid: &str,
        _claims: Map<String, Value>,
    ) -> Result<(), IdentityError> {
        Err(IdentityError::NotConfigured)
    }
}
