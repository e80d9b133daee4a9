use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub identity: IdentityConfig,
    pub security: SecurityConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Raw service-account JSON, usually injected as a secret
    #[serde(skip_serializing)]
    pub credentials_json: Option<String>,
    /// Path to a service-account JSON file
    pub credentials_path: Option<String>,
    /// Overrides the project id found in the service account
    pub project_id: Option<String>,
    pub identity_toolkit_url: String,
    pub jwks_url: String,
    pub token_uri: Option<String>,
    pub key_cache_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Empty or containing "*" means any origin
    pub cors_origins: Vec<String>,
    pub enable_audit_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub bootstrap_emails: Vec<String>,
    pub bootstrap_added_by: String,
}

pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("ADMIN_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Identity overrides
        if let Ok(v) = env::var("GOOGLE_APPLICATION_CREDENTIALS_JSON") {
            if !v.trim().is_empty() {
                self.identity.credentials_json = Some(v);
            }
        }
        if let Ok(v) = env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            if !v.trim().is_empty() {
                self.identity.credentials_path = Some(v);
            }
        }
        if let Ok(v) = env::var("FIREBASE_PROJECT_ID") {
            self.identity.project_id = Some(v);
        }
        if let Ok(v) = env::var("IDENTITY_TOOLKIT_URL") {
            self.identity.identity_toolkit_url = v;
        }
        if let Ok(v) = env::var("IDENTITY_JWKS_URL") {
            self.identity.jwks_url = v;
        }
        if let Ok(v) = env::var("IDENTITY_TOKEN_URI") {
            self.identity.token_uri = Some(v);
        }
        if let Ok(v) = env::var("IDENTITY_KEY_CACHE_SECS") {
            self.identity.key_cache_secs = v.parse().unwrap_or(self.identity.key_cache_secs);
        }
        if let Ok(v) = env::var("IDENTITY_REQUEST_TIMEOUT_SECS") {
            self.identity.request_timeout_secs = v.parse().unwrap_or(self.identity.request_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = parse_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_AUDIT_LOGGING") {
            self.security.enable_audit_logging = v.parse().unwrap_or(self.security.enable_audit_logging);
        }

        // Admin overrides
        if let Ok(v) = env::var("ADMIN_BOOTSTRAP_EMAILS") {
            self.admin.bootstrap_emails = parse_list(&v);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            identity: IdentityConfig::defaults(10),
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
                enable_audit_logging: false,
            },
            admin: AdminConfig::defaults(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            identity: IdentityConfig::defaults(5),
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
                enable_audit_logging: true,
            },
            admin: AdminConfig::defaults(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            identity: IdentityConfig::defaults(5),
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
                enable_audit_logging: true,
            },
            admin: AdminConfig::defaults(),
        }
    }

    /// Baseline configuration for tests and embedders that do not read the environment
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.server.host = "127.0.0.1".to_string();
        config
    }
}

impl IdentityConfig {
    fn defaults(request_timeout_secs: u64) -> Self {
        Self {
            credentials_json: None,
            credentials_path: None,
            project_id: None,
            identity_toolkit_url: DEFAULT_IDENTITY_TOOLKIT_URL.to_string(),
            jwks_url: DEFAULT_JWKS_URL.to_string(),
            token_uri: None,
            key_cache_secs: 3600,
            request_timeout_secs,
        }
    }
}

impl AdminConfig {
    fn defaults() -> Self {
        Self {
            bootstrap_emails: Vec::new(),
            bootstrap_added_by: "system".to_string(),
        }
    }
}

/// Split a comma-separated env value, dropping empty entries
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
