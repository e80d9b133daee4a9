use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use super::{IdentityClaim, IdentityError, IdentityProvider, ProviderUser};

/// In-process identity provider with opaque tokens.
///
/// Used by the test suites and for local runs without Firebase credentials.
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    state: RwLock<MemoryState>,
    fail_claim_updates: AtomicBool,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<String, ProviderUser>,
    tokens: HashMap<String, String>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account for `email`, returning its uid. Idempotent per email.
    pub fn add_user(&self, email: &str) -> String {
        let mut state = self.state.write();
        if let Some(user) = state.users.values().find(|u| u.email.as_deref() == Some(email)) {
            return user.uid.clone();
        }

        let uid = Uuid::new_v4().simple().to_string();
        state.users.insert(
            uid.clone(),
            ProviderUser {
                uid: uid.clone(),
                email: Some(email.to_string()),
                custom_claims: Map::new(),
            },
        );
        uid
    }

    /// Issue a token for `email`, registering the account if needed
    pub fn issue_token(&self, email: &str) -> String {
        let uid = self.add_user(email);
        self.issue_token_for_uid(uid)
    }

    /// Issue a token whose identity carries no email claim
    pub fn issue_token_without_email(&self) -> String {
        let uid = Uuid::new_v4().simple().to_string();
        self.state.write().users.insert(
            uid.clone(),
            ProviderUser {
                uid: uid.clone(),
                email: None,
                custom_claims: Map::new(),
            },
        );
        self.issue_token_for_uid(uid)
    }

    fn issue_token_for_uid(&self, uid: String) -> String {
        let token = format!("memory.{}", Uuid::new_v4().simple());
        self.state.write().tokens.insert(token.clone(), uid);
        token
    }

    pub fn revoke_token(&self, token: &str) {
        self.state.write().tokens.remove(token);
    }

    /// Custom claims currently attached to the account for `email`
    pub fn custom_claims(&self, email: &str) -> Option<Map<String, Value>> {
        self.state
            .read()
            .users
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .map(|u| u.custom_claims.clone())
    }

    /// Make subsequent `set_custom_user_claims` calls fail
    pub fn fail_claim_updates(&self, fail: bool) {
        self.fail_claim_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn verify_id_token(&self, token: &str) -> Result<IdentityClaim, IdentityError> {
        let state = self.state.read();
        let user = state
            .tokens
            .get(token)
            .and_then(|uid| state.users.get(uid))
            .ok_or_else(|| IdentityError::InvalidToken("unknown token".to_string()))?;

        Ok(IdentityClaim {
            uid: user.uid.clone(),
            email: user.email.clone(),
            email_verified: user.email.is_some(),
            claims: user.custom_claims.clone(),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<ProviderUser, IdentityError> {
        self.state
            .read()
            .users
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned()
            .ok_or_else(|| IdentityError::UserNotFound(email.to_string()))
    }

    async fn set_custom_user_claims(
        &self,
        uid: &str,
        claims: Map<String, Value>,
    ) -> Result<(), IdentityError> {
        if self.fail_claim_updates.load(Ordering::SeqCst) {
            return Err(IdentityError::Upstream {
                status: 503,
                message: "claim updates unavailable".to_string(),
            });
        }

        let mut state = self.state.write();
        let user = state
            .users
            .get_mut(uid)
            .ok_or_else(|| IdentityError::UserNotFound(uid.to_string()))?;
        user.custom_claims = claims;
        Ok(())
    }
}
