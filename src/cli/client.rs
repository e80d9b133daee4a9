use reqwest::{RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::admin::AdminRecord;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("No bearer token; pass --token or set ADMIN_API_TOKEN")]
    MissingToken,
}

impl ClientError {
    /// HTTP status for server-side rejections
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationReply {
    pub message: String,
    #[serde(default)]
    pub claims_mirrored: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckReply {
    is_admin: bool,
}

#[derive(Debug, Deserialize)]
struct ListReply {
    admins: Vec<AdminRecord>,
}

/// HTTP client for a running Admin API server
pub struct AdminClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl AdminClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(builder.bearer_auth(token))
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed"))
                .to_string();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Whether the token's owner is an admin
    pub async fn check(&self) -> Result<bool, ClientError> {
        let request = self.authed(self.http.get(self.url("api/admin/check")?))?;
        let reply: CheckReply = self.execute(request).await?;
        Ok(reply.is_admin)
    }

    pub async fn list(&self) -> Result<Vec<AdminRecord>, ClientError> {
        let request = self.authed(self.http.get(self.url("api/admin/list")?))?;
        let reply: ListReply = self.execute(request).await?;
        Ok(reply.admins)
    }

    pub async fn add(&self, email: &str) -> Result<MutationReply, ClientError> {
        let request = self.authed(self.http.post(self.url("api/admin/add")?))?.json(&json!({ "email": email }));
        self.execute(request).await
    }

    pub async fn remove(&self, email: &str) -> Result<MutationReply, ClientError> {
        let request = self.authed(self.http.post(self.url("api/admin/remove")?))?.json(&json!({ "email": email }));
        self.execute(request).await
    }

    pub async fn search(&self, query: &str) -> Result<Value, ClientError> {
        let request = self.http.post(self.url("api/search")?).json(&json!({ "query": query }));
        self.execute(request).await
    }

    /// Health body along with whether the server reported itself healthy
    pub async fn health(&self) -> Result<(bool, Value), ClientError> {
        let response = self.http.get(self.url("health")?).send().await?;
        let status = response.status();
        let body: Value = response.json().await?;
        Ok((status == StatusCode::OK, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let client = AdminClient::new("http://localhost:5000/backend", None).unwrap();
        assert_eq!(
            client.url("api/admin/check").unwrap().as_str(),
            "http://localhost:5000/backend/api/admin/check"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            AdminClient::new("not a url", None),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_admin_calls_need_token() {
        let client = AdminClient::new("http://localhost:5000", None).unwrap();
        let builder = client.http.get(client.url("api/admin/list").unwrap());
        assert!(matches!(client.authed(builder), Err(ClientError::MissingToken)));
    }
}
