use std::sync::Arc;

use crate::admin::AdminRegistry;
use crate::auth::AuthorizationGate;
use crate::config::AppConfig;
use crate::identity::IdentityProvider;
use crate::services::AdminService;

/// Application state shared across all request handlers.
///
/// The registry is owned here and handed to the gate and the admin service;
/// nothing else holds it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<AdminRegistry>,
    pub identity: Arc<dyn IdentityProvider>,
    pub gate: AuthorizationGate,
    pub admins: AdminService,
}

impl AppState {
    pub fn new(config: AppConfig, registry: AdminRegistry, identity: Arc<dyn IdentityProvider>) -> Self {
        let registry = Arc::new(registry);
        let gate = AuthorizationGate::new(identity.clone(), registry.clone());
        let admins = AdminService::new(registry.clone(), identity.clone())
            .with_audit_logging(config.security.enable_audit_logging);

        Self {
            config: Arc::new(config),
            registry,
            identity,
            gate,
            admins,
        }
    }

    /// Build state from configuration: identity provider from credentials,
    /// registry seeded with the bootstrap admins.
    pub fn from_config(config: AppConfig) -> Self {
        let identity = crate::identity::from_config(&config.identity);
        let registry = AdminRegistry::with_bootstrap(
            config.admin.bootstrap_emails.iter().cloned(),
            &config.admin.bootstrap_added_by,
        );

        if registry.is_empty() {
            tracing::warn!("No bootstrap admins configured (ADMIN_BOOTSTRAP_EMAILS); admin-only endpoints will reject every caller");
        } else {
            tracing::info!("Seeded {} bootstrap admin(s)", registry.len());
        }

        Self::new(config, registry, identity)
    }
}
