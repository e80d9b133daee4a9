#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use admin_api_rust::admin::AdminRegistry;
use admin_api_rust::config::AppConfig;
use admin_api_rust::identity::{IdentityProvider, MemoryIdentityProvider};
use admin_api_rust::{app, AppState};

pub const ROOT_ADMIN: &str = "root@example.com";

pub struct TestServer {
    pub base_url: String,
    pub provider: Arc<MemoryIdentityProvider>,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Token for an account with `email`, registering the account upstream
    pub fn token_for(&self, email: &str) -> String {
        self.provider.issue_token(email)
    }

    pub fn admin_emails(&self) -> Vec<String> {
        self.state.registry.list().into_iter().map(|r| r.email).collect()
    }
}

/// Serve the app on a free port with an in-memory identity provider.
/// Every email in `admins` is both an upstream account and a bootstrap admin.
pub async fn spawn_server(admins: &[&str]) -> Result<TestServer> {
    let provider = Arc::new(MemoryIdentityProvider::new());
    for email in admins {
        provider.add_user(email);
    }
    let registry = AdminRegistry::with_bootstrap(admins.iter().copied(), "system");
    let state = AppState::new(AppConfig::for_tests(), registry, provider.clone());

    let base_url = serve_with(state.clone()).await?;

    Ok(TestServer {
        base_url,
        provider,
        state,
        client: reqwest::Client::new(),
    })
}

/// Serve the app with an arbitrary identity provider, returning its base URL
pub async fn spawn_with_provider(provider: Arc<dyn IdentityProvider>, admins: &[&str]) -> Result<(String, AppState)> {
    let registry = AdminRegistry::with_bootstrap(admins.iter().copied(), "system");
    let state = AppState::new(AppConfig::for_tests(), registry, provider);
    let base_url = serve_with(state.clone()).await?;
    Ok((base_url, state))
}

async fn serve_with(state: AppState) -> Result<String> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app(state)).await {
            eprintln!("test server stopped: {}", e);
        }
    });

    Ok(format!("http://127.0.0.1:{}", port))
}
