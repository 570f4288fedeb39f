//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, minting host tokens, and
//! making HTTP requests.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use guestbook_api::{create_app, create_app_state};
use guestbook_common::{AppConfig, JwtService};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    jwt: JwtService,
    _uploads: TempDir,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        let config = test_config()?;
        Self::start_with_config(config).await
    }

    /// Start a test server with custom config
    ///
    /// The listener is bound first so upload URLs point at the real port.
    pub async fn start_with_config(mut config: AppConfig) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let uploads = tempfile::tempdir()?;
        config.storage.upload_dir = uploads.path().to_string_lossy().into_owned();
        config.app.public_base_url = format!("http://{addr}");

        let jwt = JwtService::new(&config.jwt.secret, config.jwt.access_token_expiry);
        let state = create_app_state(config).await?;
        let app = create_app(state)?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            jwt,
            _uploads: uploads,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Bearer token for a host identity
    pub fn host_token(&self, host_id: &str) -> Result<String> {
        Ok(self.jwt.issue_token(host_id)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url(), path)
    }

    fn authed(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// GET outside `/api/v1`
    pub async fn get_raw(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// GET, with an optional host token
    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Response> {
        let builder = self.client.get(self.url(path));
        Ok(Self::authed(builder, token).send().await?)
    }

    /// POST a JSON body, with an optional host token
    pub async fn post<T: Serialize>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &T,
    ) -> Result<Response> {
        let builder = self.client.post(self.url(path)).json(body);
        Ok(Self::authed(builder, token).send().await?)
    }

    /// POST without a body
    pub async fn post_empty(&self, path: &str, token: Option<&str>) -> Result<Response> {
        let builder = self.client.post(self.url(path));
        Ok(Self::authed(builder, token).send().await?)
    }

    /// PATCH a JSON body with a host token
    pub async fn patch<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        let builder = self.client.patch(self.url(path)).json(body);
        Ok(Self::authed(builder, Some(token)).send().await?)
    }

    /// DELETE with a host token
    pub async fn delete(&self, path: &str, token: &str) -> Result<Response> {
        let builder = self.client.delete(self.url(path));
        Ok(Self::authed(builder, Some(token)).send().await?)
    }

    /// PUT raw bytes to an absolute upload URL
    pub async fn put_bytes(&self, url: &str, bytes: Vec<u8>) -> Result<Response> {
        Ok(self.client.put(url).body(bytes).send().await?)
    }
}

/// Create a test configuration
///
/// Rate limits are lifted so a burst of test requests is never throttled.
pub fn test_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    // The listener picks its own port; API_PORT only has to parse
    if std::env::var("API_PORT").is_err() {
        std::env::set_var("API_PORT", "0");
    }

    let mut config =
        AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;
    config.rate_limit.requests_per_second = 10_000;
    config.rate_limit.burst = 10_000;

    Ok(config)
}

/// Helper to check if test environment is available
pub async fn check_test_env() -> bool {
    dotenvy::dotenv().ok();

    for var in ["DATABASE_URL", "JWT_SECRET"] {
        if std::env::var(var).is_err() {
            eprintln!("Skipping test: {var} not set");
            return false;
        }
    }

    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}
