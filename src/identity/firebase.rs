use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, encode, jwk::JwkSet, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use url::Url;

use super::{IdentityClaim, IdentityError, IdentityProvider, ProviderUser, ServiceAccount};
use crate::config::IdentityConfig;

const OAUTH_SCOPES: &str = "https://www.googleapis.com/auth/identitytoolkit https://www.googleapis.com/auth/firebase https://www.googleapis.com/auth/cloud-platform";
const ASSERTION_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// Refresh access tokens a little before Google expires them
const ACCESS_TOKEN_MARGIN: Duration = Duration::from_secs(60);
// Unknown key ids refetch the key set at most this often
const MIN_KEY_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
// Tolerated clock skew for iat and auth_time
const CLOCK_SKEW_SECS: i64 = 60;

/// Firebase Authentication backed by Google's public REST endpoints.
///
/// ID tokens are checked locally against the published securetoken JWKs.
/// Account lookups and custom-claim writes go through the Identity Toolkit API
/// using an OAuth2 access token minted from the service account.
pub struct FirebaseIdentityProvider {
    account: ServiceAccount,
    signing_key: EncodingKey,
    http: reqwest::Client,
    toolkit_base: Url,
    jwks_url: String,
    key_cache_ttl: Duration,
    keys: RwLock<Option<KeyCache>>,
    key_refresh: tokio::sync::Mutex<()>,
    access_token: Mutex<Option<AccessToken>>,
}

struct KeyCache {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

struct AccessToken {
    token: String,
    expires_at: Instant,
}

/// Claims carried by a Firebase ID token
#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    auth_time: Option<i64>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Self-signed assertion exchanged for an access token
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    custom_attributes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
}

impl FirebaseIdentityProvider {
    pub fn new(account: ServiceAccount, config: &IdentityConfig) -> Result<Self, IdentityError> {
        let signing_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| IdentityError::Credentials(format!("invalid private key: {}", e)))?;

        let mut toolkit_base = Url::parse(&config.identity_toolkit_url).map_err(|e| {
            IdentityError::InvalidConfig(format!("identity toolkit url '{}': {}", config.identity_toolkit_url, e))
        })?;
        // Url::join replaces the last segment unless the base ends with a slash
        if !toolkit_base.path().ends_with('/') {
            let path = format!("{}/", toolkit_base.path());
            toolkit_base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            account,
            signing_key,
            http,
            toolkit_base,
            jwks_url: config.jwks_url.clone(),
            key_cache_ttl: Duration::from_secs(config.key_cache_secs),
            keys: RwLock::new(None),
            key_refresh: tokio::sync::Mutex::new(()),
            access_token: Mutex::new(None),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.account.project_id
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.account.project_id)
    }

    fn cached_key(&self, kid: &str) -> Option<DecodingKey> {
        self.keys
            .read()
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.key_cache_ttl)
            .and_then(|c| c.keys.get(kid).cloned())
    }

    /// Whether the key set is old enough (or absent) to be fetched again
    fn refetch_allowed(&self) -> bool {
        self.keys
            .read()
            .as_ref()
            .map(|c| c.fetched_at.elapsed() >= MIN_KEY_REFRESH_INTERVAL.min(self.key_cache_ttl))
            .unwrap_or(true)
    }

    async fn refresh_keys(&self) -> Result<(), IdentityError> {
        let set: JwkSet = self
            .http
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut keys = HashMap::new();
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(e) => tracing::warn!("Skipping unusable signing key '{}': {}", kid, e),
            }
        }

        tracing::debug!("Fetched {} token signing keys", keys.len());
        *self.keys.write() = Some(KeyCache {
            keys,
            fetched_at: Instant::now(),
        });
        Ok(())
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, IdentityError> {
        if let Some(key) = self.cached_key(kid) {
            return Ok(key);
        }

        let unknown = || IdentityError::InvalidToken(format!("unknown signing key '{}'", kid));
        if !self.refetch_allowed() {
            return Err(unknown());
        }

        // Single flight: waiters re-check whatever the leader fetched
        let _guard = self.key_refresh.lock().await;
        if let Some(key) = self.cached_key(kid) {
            return Ok(key);
        }
        if !self.refetch_allowed() {
            return Err(unknown());
        }

        self.refresh_keys().await?;
        self.cached_key(kid).ok_or_else(unknown)
    }

    async fn bearer(&self) -> Result<String, IdentityError> {
        let cached = self
            .access_token
            .lock()
            .as_ref()
            .filter(|cached| Instant::now() + ACCESS_TOKEN_MARGIN < cached.expires_at)
            .map(|cached| cached.token.clone());
        if let Some(token) = cached {
            return Ok(token);
        }

        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.account.client_email,
            sub: &self.account.client_email,
            scope: OAUTH_SCOPES,
            aud: &self.account.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.account.private_key_id.clone();

        let assertion = encode(&header, &claims, &self.signing_key)
            .map_err(|e| IdentityError::Credentials(format!("cannot sign assertion: {}", e)))?;

        let response = self
            .http
            .post(&self.account.token_uri)
            .form(&[("grant_type", ASSERTION_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let token: TokenResponse = upstream_error(response).await?.json().await?;

        *self.access_token.lock() = Some(AccessToken {
            token: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(token.access_token)
    }

    fn accounts_url(&self, action: &str) -> Result<Url, IdentityError> {
        self.toolkit_base
            .join(&format!("v1/projects/{}/accounts:{}", self.account.project_id, action))
            .map_err(|e| IdentityError::InvalidConfig(e.to_string()))
    }
}

/// Turn a non-success response into `IdentityError::Upstream`
async fn upstream_error(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GoogleErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    Err(IdentityError::Upstream {
        status: status.as_u16(),
        message,
    })
}

/// `iat` and `auth_time` must both be present and not in the future
fn check_issued_times(iat: Option<i64>, auth_time: Option<i64>, now: i64) -> Result<(), IdentityError> {
    let latest = now + CLOCK_SKEW_SECS;
    match iat {
        None => return Err(IdentityError::InvalidToken("token has no iat".to_string())),
        Some(iat) if iat > latest => {
            return Err(IdentityError::InvalidToken("token issued in the future".to_string()))
        }
        Some(_) => {}
    }
    match auth_time {
        None => Err(IdentityError::InvalidToken("token has no auth_time".to_string())),
        Some(t) if t > latest => Err(IdentityError::InvalidToken("auth_time is in the future".to_string())),
        Some(_) => Ok(()),
    }
}

fn parse_custom_attributes(raw: Option<&str>) -> Map<String, Value> {
    match raw {
        None | Some("") => Map::new(),
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed custom claims '{}': {}", raw, e);
            Map::new()
        }),
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    fn name(&self) -> &'static str {
        "firebase"
    }

    async fn verify_id_token(&self, token: &str) -> Result<IdentityClaim, IdentityError> {
        let header = decode_header(token).map_err(|e| IdentityError::InvalidToken(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(IdentityError::InvalidToken(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::InvalidToken("token has no key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.account.project_id]);
        validation.set_issuer(&[self.issuer()]);

        let data = decode::<FirebaseClaims>(token, &key, &validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let mut claims = data.claims;
        if claims.sub.is_empty() {
            return Err(IdentityError::InvalidToken("token has an empty subject".to_string()));
        }
        check_issued_times(claims.iat, claims.auth_time, Utc::now().timestamp())?;
        if let Some(auth_time) = claims.auth_time {
            claims.rest.insert("auth_time".to_string(), Value::from(auth_time));
        }
        if let Some(iat) = claims.iat {
            claims.rest.insert("iat".to_string(), Value::from(iat));
        }

        Ok(IdentityClaim {
            uid: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified,
            claims: claims.rest,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<ProviderUser, IdentityError> {
        let bearer = self.bearer().await?;
        let response = self
            .http
            .post(self.accounts_url("lookup")?)
            .bearer_auth(bearer)
            .json(&json!({ "email": [email] }))
            .send()
            .await?;
        let lookup: LookupResponse = upstream_error(response).await?.json().await?;

        let account = lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| IdentityError::UserNotFound(email.to_string()))?;

        Ok(ProviderUser {
            custom_claims: parse_custom_attributes(account.custom_attributes.as_deref()),
            uid: account.local_id,
            email: account.email,
        })
    }

    async fn set_custom_user_claims(
        &self,
        uid: &str,
        claims: Map<String, Value>,
    ) -> Result<(), IdentityError> {
        let bearer = self.bearer().await?;
        let response = self
            .http
            .post(self.accounts_url("update")?)
            .bearer_auth(bearer)
            .json(&json!({
                "localId": uid,
                "customAttributes": Value::Object(claims).to_string(),
            }))
            .send()
            .await?;

        match upstream_error(response).await {
            Ok(_) => Ok(()),
            Err(IdentityError::Upstream { message, .. }) if message.starts_with("USER_NOT_FOUND") => {
                Err(IdentityError::UserNotFound(uid.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}
