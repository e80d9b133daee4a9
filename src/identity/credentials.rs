use serde::Deserialize;

use super::IdentityError;
use crate::config::IdentityConfig;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Google service-account key file
#[derive(Clone, Deserialize)]
pub struct ServiceAccount {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

// Keep the private key out of logs
impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("kind", &self.kind)
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccount {
    pub fn from_json(raw: &str) -> Result<Self, IdentityError> {
        let account: ServiceAccount = serde_json::from_str(raw)
            .map_err(|e| IdentityError::Credentials(format!("malformed service account JSON: {}", e)))?;

        if let Some(kind) = &account.kind {
            if kind != "service_account" {
                return Err(IdentityError::Credentials(format!(
                    "expected credential type 'service_account', got '{}'",
                    kind
                )));
            }
        }
        if account.client_email.trim().is_empty() {
            return Err(IdentityError::Credentials("client_email is empty".to_string()));
        }

        Ok(account)
    }

    /// Load credentials from inline JSON first, then from a file path.
    /// `Ok(None)` means nothing was configured.
    pub fn from_config(config: &IdentityConfig) -> Result<Option<Self>, IdentityError> {
        let raw = if let Some(json) = &config.credentials_json {
            json.clone()
        } else if let Some(path) = &config.credentials_path {
            std::fs::read_to_string(path).map_err(|e| {
                IdentityError::Credentials(format!("cannot read '{}': {}", path, e))
            })?
        } else {
            return Ok(None);
        };

        let mut account = Self::from_json(&raw)?;
        if let Some(project_id) = &config.project_id {
            account.project_id = project_id.clone();
        }
        if let Some(token_uri) = &config.token_uri {
            account.token_uri = token_uri.clone();
        }
        Ok(Some(account))
    }
}
