//! Test helpers for integration tests
//!
//! Provides the test server, an authenticated HTTP client per user and the
//! live feed client.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agora_api::{create_app, in_memory_state};
use agora_common::{AppConfig, JwtService};
use agora_core::Snowflake;
use agora_db::MemoryStore;
use anyhow::{Context, Result};
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::fixtures::seeded_store;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// How long to wait for a live feed message
const LIVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryStore>,
    jwt: JwtService,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on the standard seeded store
    pub async fn start() -> Result<Self> {
        Self::start_with_store(seeded_store()).await
    }

    pub async fn start_with_store(store: Arc<MemoryStore>) -> Result<Self> {
        let config = test_config(&[])?;
        let jwt = JwtService::new(&config.jwt.secret, config.jwt.access_token_expiry);

        let state = in_memory_state(config, store.clone())?;
        let app = create_app(state);

        // Port 0 lets the OS pick a free port
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            store,
            jwt,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Bearer token for a seeded user
    pub fn token(&self, user_id: Snowflake) -> Result<String> {
        Ok(self.jwt.issue_access_token(user_id)?)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a GET request as `user`
    pub async fn get_as(&self, path: &str, user: Snowflake) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(self.token(user)?)
            .send()
            .await?)
    }

    /// Make a POST request with a JSON body as `user`
    pub async fn post_as<T: Serialize>(
        &self,
        path: &str,
        user: Snowflake,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(self.token(user)?)
            .json(body)
            .send()
            .await?)
    }

    /// Make a POST request without a body as `user`
    pub async fn post_empty_as(&self, path: &str, user: Snowflake) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(self.token(user)?)
            .send()
            .await?)
    }

    /// Make a PUT request as `user`
    pub async fn put_as(&self, path: &str, user: Snowflake) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(self.token(user)?)
            .send()
            .await?)
    }

    /// Make a DELETE request as `user`
    pub async fn delete_as(&self, path: &str, user: Snowflake) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(self.token(user)?)
            .send()
            .await?)
    }

    /// Open the live feed for `user`
    pub async fn connect_live(&self, user: Snowflake) -> Result<LiveClient> {
        let url = format!(
            "ws://{}/api/v1/notifications/live?token={}",
            self.addr,
            self.token(user)?
        );
        let (stream, _) = connect_async(url).await?;
        Ok(LiveClient { stream })
    }
}

/// WebSocket client for the live notification feed
pub struct LiveClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl LiveClient {
    /// Next JSON text frame, skipping control frames
    pub async fn next_json(&mut self) -> Result<Value> {
        loop {
            let frame = tokio::time::timeout(LIVE_TIMEOUT, self.stream.next())
                .await
                .context("timed out waiting for a live message")?
                .context("live feed closed")??;

            match frame {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(_) => anyhow::bail!("live feed closed"),
                _ => {}
            }
        }
    }

    /// Next `UNREAD_COUNT` value
    pub async fn next_count(&mut self) -> Result<u64> {
        let message = self.next_json().await?;
        anyhow::ensure!(
            message["type"] == "UNREAD_COUNT",
            "unexpected live message: {message}"
        );
        message["unread_count"]
            .as_u64()
            .context("unread_count is not a number")
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Configuration for tests: in-memory backends plus any overrides
pub fn test_config(overrides: &[(&str, &str)]) -> Result<AppConfig> {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("API_PORT".to_string(), "0".to_string()),
        ("JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string()),
        ("RATE_LIMIT_BURST".to_string(), "1000".to_string()),
        ("RATE_LIMIT_REQUESTS_PER_SECOND".to_string(), "1000".to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert((*key).to_string(), (*value).to_string());
    }

    AppConfig::from_lookup(|key| vars.get(key).cloned())
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status and return the error code of the body
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(String::from)
        .context("error body has no code")
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
