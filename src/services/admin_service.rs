use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::admin::{AdminRecord, AdminRegistry, RegistryError};
use crate::auth::AdminCaller;
use crate::identity::{IdentityError, IdentityProvider};

/// Custom claim mirrored into the identity provider
pub const ADMIN_CLAIM: &str = "admin";

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Email is required")]
    EmailRequired,

    #[error("User is already an admin")]
    AlreadyExists(String),

    #[error("User not found in identity provider")]
    NotFoundUpstream(String),

    #[error("Cannot remove yourself as admin")]
    SelfRemoval,

    #[error("Identity provider error: {0}")]
    Identity(IdentityError),
}

impl From<RegistryError> for AdminError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::AlreadyExists(email) => AdminError::AlreadyExists(email),
        }
    }
}

/// Result of a registry write followed by best-effort claim mirroring.
///
/// The registry is authoritative; a failed mirror never rolls the registry back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum MutationOutcome {
    Applied,
    #[serde(rename_all = "camelCase")]
    AppliedPartially { registry_ok: bool, mirror_ok: bool },
}

impl MutationOutcome {
    fn from_steps(registry_ok: bool, mirror_ok: bool) -> Self {
        if registry_ok && mirror_ok {
            MutationOutcome::Applied
        } else {
            MutationOutcome::AppliedPartially { registry_ok, mirror_ok }
        }
    }

    pub fn mirror_ok(&self) -> bool {
        match self {
            MutationOutcome::Applied => true,
            MutationOutcome::AppliedPartially { mirror_ok, .. } => *mirror_ok,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AddedAdmin {
    pub record: AdminRecord,
    pub outcome: MutationOutcome,
}

#[derive(Debug, Clone)]
pub struct RemovedAdmin {
    /// False when the email was not an admin to begin with
    pub removed: bool,
    pub outcome: MutationOutcome,
}

/// Admin management operations over the registry and the identity provider
#[derive(Clone)]
pub struct AdminService {
    registry: Arc<AdminRegistry>,
    identity: Arc<dyn IdentityProvider>,
    audit: bool,
}

impl AdminService {
    pub fn new(registry: Arc<AdminRegistry>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            registry,
            identity,
            audit: false,
        }
    }

    pub fn with_audit_logging(mut self, enabled: bool) -> Self {
        self.audit = enabled;
        self
    }

    pub fn list(&self) -> Vec<AdminRecord> {
        self.registry.list()
    }

    /// Grant admin to `email` on behalf of `caller`
    pub async fn add_admin(&self, caller: &AdminCaller, email: &str) -> Result<AddedAdmin, AdminError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AdminError::EmailRequired);
        }

        if self.registry.is_admin(email) {
            return Err(AdminError::AlreadyExists(email.to_string()));
        }

        let user = self.identity.get_user_by_email(email).await.map_err(|e| match e {
            IdentityError::UserNotFound(_) => AdminError::NotFoundUpstream(email.to_string()),
            other => AdminError::Identity(other),
        })?;

        // Re-checked under the registry lock; the pre-check above may be stale
        let record = self.registry.add(email, &caller.email)?;

        let mirror_ok = self.mirror_claim(&user.uid, user.custom_claims, true).await;
        let outcome = MutationOutcome::from_steps(true, mirror_ok);

        if self.audit {
            tracing::info!(target: "audit", actor = %caller.email, target_email = %email, ?outcome, "admin added");
        }

        Ok(AddedAdmin { record, outcome })
    }

    /// Revoke admin from `email` on behalf of `caller`. Revoking an email that
    /// is not an admin succeeds without changing the registry.
    pub async fn remove_admin(&self, caller: &AdminCaller, email: &str) -> Result<RemovedAdmin, AdminError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AdminError::EmailRequired);
        }
        if email == caller.email {
            return Err(AdminError::SelfRemoval);
        }

        let removed = self.registry.remove(email);
        if !removed {
            tracing::debug!("Remove requested for '{}' which is not an admin", email);
        }

        let mirror_ok = match self.identity.get_user_by_email(email).await {
            Ok(user) => self.mirror_claim(&user.uid, user.custom_claims, false).await,
            Err(e) => {
                tracing::warn!("Failed to remove custom claims for '{}': {}", email, e);
                false
            }
        };
        let outcome = MutationOutcome::from_steps(true, mirror_ok);

        if self.audit {
            tracing::info!(target: "audit", actor = %caller.email, target_email = %email, removed, ?outcome, "admin removed");
        }

        Ok(RemovedAdmin { removed, outcome })
    }

    /// Write the admin flag into the account's custom claims, keeping any other
    /// claims it already carries. Failures are logged and reported as `false`.
    async fn mirror_claim(&self, uid: &str, mut claims: serde_json::Map<String, Value>, admin: bool) -> bool {
        claims.insert(ADMIN_CLAIM.to_string(), Value::Bool(admin));

        match self.identity.set_custom_user_claims(uid, claims).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to set custom claims for uid '{}': {}", uid, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdentityClaim, MemoryIdentityProvider};
    use serde_json::json;

    struct Fixture {
        service: AdminService,
        registry: Arc<AdminRegistry>,
        provider: Arc<MemoryIdentityProvider>,
        root: AdminCaller,
    }

    fn fixture() -> Fixture {
        let provider = Arc::new(MemoryIdentityProvider::new());
        let root_uid = provider.add_user("root@example.com");
        let registry = Arc::new(AdminRegistry::with_bootstrap(["root@example.com"], "system"));
        let service = AdminService::new(registry.clone(), provider.clone());
        let root = AdminCaller {
            email: "root@example.com".to_string(),
            identity: IdentityClaim {
                uid: root_uid,
                email: Some("root@example.com".to_string()),
                email_verified: true,
                claims: Default::default(),
            },
        };
        Fixture {
            service,
            registry,
            provider,
            root,
        }
    }

    #[tokio::test]
    async fn test_add_applies_registry_and_claims() {
        let f = fixture();
        f.provider.add_user("new@example.com");

        let added = f.service.add_admin(&f.root, "new@example.com").await.unwrap();
        assert_eq!(added.outcome, MutationOutcome::Applied);
        assert_eq!(added.record.added_by, "root@example.com");
        assert!(f.registry.is_admin("new@example.com"));
        assert_eq!(
            f.provider.custom_claims("new@example.com").unwrap().get(ADMIN_CLAIM),
            Some(&json!(true))
        );
    }

    #[tokio::test]
    async fn test_add_twice_fails_with_already_exists() {
        let f = fixture();
        f.provider.add_user("new@example.com");
        f.service.add_admin(&f.root, "new@example.com").await.unwrap();

        let err = f.service.add_admin(&f.root, "new@example.com").await.unwrap_err();
        assert!(matches!(err, AdminError::AlreadyExists(_)));
        assert_eq!(f.registry.len(), 2);
    }

    #[tokio::test]
    async fn test_add_unknown_upstream_user_fails() {
        let f = fixture();
        let err = f.service.add_admin(&f.root, "ghost@example.com").await.unwrap_err();
        assert!(matches!(err, AdminError::NotFoundUpstream(_)));
        assert!(!f.registry.is_admin("ghost@example.com"));
    }

    #[tokio::test]
    async fn test_add_blank_email_rejected() {
        let f = fixture();
        assert!(matches!(
            f.service.add_admin(&f.root, "   ").await,
            Err(AdminError::EmailRequired)
        ));
    }

    #[tokio::test]
    async fn test_remove_blank_email_rejected() {
        let f = fixture();
        for email in ["", "  "] {
            assert!(matches!(
                f.service.remove_admin(&f.root, email).await,
                Err(AdminError::EmailRequired)
            ));
        }
        assert_eq!(f.registry.len(), 1);
    }

    #[tokio::test]
    async fn test_mirror_failure_keeps_registry_write() {
        let f = fixture();
        f.provider.add_user("new@example.com");
        f.provider.fail_claim_updates(true);

        let added = f.service.add_admin(&f.root, "new@example.com").await.unwrap();
        assert_eq!(
            added.outcome,
            MutationOutcome::AppliedPartially {
                registry_ok: true,
                mirror_ok: false
            }
        );
        assert!(f.registry.is_admin("new@example.com"));
    }

    #[tokio::test]
    async fn test_mirror_preserves_existing_claims() {
        let f = fixture();
        let uid = f.provider.add_user("new@example.com");
        let mut existing = serde_json::Map::new();
        existing.insert("tier".to_string(), json!("gold"));
        f.provider.set_custom_user_claims(&uid, existing).await.unwrap();

        f.service.add_admin(&f.root, "new@example.com").await.unwrap();
        let claims = f.provider.custom_claims("new@example.com").unwrap();
        assert_eq!(claims.get("tier"), Some(&json!("gold")));
        assert_eq!(claims.get(ADMIN_CLAIM), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_self_removal_always_rejected() {
        let f = fixture();
        let err = f.service.remove_admin(&f.root, "root@example.com").await.unwrap_err();
        assert!(matches!(err, AdminError::SelfRemoval));
        assert!(f.registry.is_admin("root@example.com"));

        // Also when the caller is somehow no longer listed
        f.registry.remove("root@example.com");
        assert!(matches!(
            f.service.remove_admin(&f.root, "root@example.com").await,
            Err(AdminError::SelfRemoval)
        ));
    }

    #[tokio::test]
    async fn test_remove_clears_registry_and_claim() {
        let f = fixture();
        f.provider.add_user("new@example.com");
        f.service.add_admin(&f.root, "new@example.com").await.unwrap();

        let removed = f.service.remove_admin(&f.root, "new@example.com").await.unwrap();
        assert!(removed.removed);
        assert_eq!(removed.outcome, MutationOutcome::Applied);
        assert!(!f.registry.is_admin("new@example.com"));
        assert_eq!(
            f.provider.custom_claims("new@example.com").unwrap().get(ADMIN_CLAIM),
            Some(&json!(false))
        );
    }

    #[tokio::test]
    async fn test_remove_absent_email_is_silent_success() {
        let f = fixture();
        let removed = f.service.remove_admin(&f.root, "ghost@example.com").await.unwrap();
        assert!(!removed.removed);
        // No upstream account, so the mirror step reports failure
        assert!(!removed.outcome.mirror_ok());
        assert_eq!(f.registry.len(), 1);
    }

    #[test]
    fn test_outcome_serialization() {
        let partial = MutationOutcome::AppliedPartially {
            registry_ok: true,
            mirror_ok: false,
        };
        assert_eq!(
            serde_json::to_value(partial).unwrap(),
            json!({"status": "appliedPartially", "registryOk": true, "mirrorOk": false})
        );
        assert_eq!(
            serde_json::to_value(MutationOutcome::Applied).unwrap(),
            json!({"status": "applied"})
        );
    }
}
