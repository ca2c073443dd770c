//! Test helpers for integration tests
//!
//! Provides utilities for spawning the API and gateway servers, making
//! identity-stamped HTTP requests, and driving websocket sessions.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use anyhow::Result;
use campus_api::{build_state, router};
use campus_common::AppConfig;
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::fixtures::TestUser;

/// Counter for unique test ports
static PORT_COUNTER: AtomicU16 = AtomicU16::new(19000);

/// Get a unique port for testing
pub fn get_test_port() -> u16 {
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        let config = test_config()?;
        Self::start_with_config(config).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let port = get_test_port();
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        // Create app state
        let state = build_state(config).await?;

        // Build application
        let app = router(state);

        // Bind to port
        let listener = TcpListener::bind(addr).await?;
        let actual_addr = listener.local_addr()?;

        // Spawn server task
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Wait for server to be ready
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Create HTTP client
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr: actual_addr,
            client,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request without identity headers
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a POST request without identity headers
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Make a GET request as the given user
    pub async fn get_as(&self, path: &str, user: &TestUser) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .get(&url)
            .header("x-user-id", &user.id)
            .header("x-user-name", &user.display_name)
            .send()
            .await?)
    }

    /// Make a POST request with JSON body as the given user
    pub async fn post_as<T: Serialize>(
        &self,
        path: &str,
        user: &TestUser,
        body: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .post(&url)
            .header("x-user-id", &user.id)
            .header("x-user-name", &user.display_name)
            .json(body)
            .send()
            .await?)
    }

    /// Make a bodyless POST request as the given user
    pub async fn post_empty_as(&self, path: &str, user: &TestUser) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .post(&url)
            .header("x-user-id", &user.id)
            .header("x-user-name", &user.display_name)
            .send()
            .await?)
    }

    /// Make a PATCH request with JSON body as the given user
    pub async fn patch_as<T: Serialize>(
        &self,
        path: &str,
        user: &TestUser,
        body: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .patch(&url)
            .header("x-user-id", &user.id)
            .header("x-user-name", &user.display_name)
            .json(body)
            .send()
            .await?)
    }

    /// Make a DELETE request as the given user
    pub async fn delete_as(&self, path: &str, user: &TestUser) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .delete(&url)
            .header("x-user-id", &user.id)
            .header("x-user-name", &user.display_name)
            .send()
            .await?)
    }

    /// Upload a file through the multipart endpoint as the given user
    pub async fn upload_as(
        &self,
        path: &str,
        user: &TestUser,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);
        Ok(self
            .client
            .post(&url)
            .header("x-user-id", &user.id)
            .header("x-user-name", &user.display_name)
            .multipart(form)
            .send()
            .await?)
    }
}

/// Client-side websocket stream used by gateway tests
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Gateway server instance that manages lifecycle
pub struct GatewayServer {
    pub addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl GatewayServer {
    /// Start a new gateway server
    pub async fn start() -> Result<Self> {
        let config = test_config()?;
        Self::start_with_config(config).await
    }

    /// Start a gateway server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let port = get_test_port();
        let addr = SocketAddr::from(([127, 0, 0, 1], port));

        let state = campus_gateway::build_state(config).await?;
        let app = campus_gateway::router(state);

        let listener = TcpListener::bind(addr).await?;
        let actual_addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        tokio::time::sleep(Duration::from_millis(100)).await;

        Ok(Self {
            addr: actual_addr,
            _handle: handle,
        })
    }

    /// Get the websocket URL for the gateway
    pub fn ws_url(&self) -> String {
        format!("ws://{}/gateway", self.addr)
    }

    /// Open a websocket session carrying the user's identity headers
    pub async fn connect(&self, user: &TestUser) -> Result<WsStream> {
        let mut request = self.ws_url().into_client_request()?;
        request
            .headers_mut()
            .insert("x-user-id", HeaderValue::from_str(&user.id)?);
        request
            .headers_mut()
            .insert("x-user-name", HeaderValue::from_str(&user.display_name)?);

        let (stream, _response) = connect_async(request).await?;
        Ok(stream)
    }

    /// Attempt an upgrade without identity headers
    ///
    /// Returns the raw handshake result so callers can inspect the HTTP
    /// rejection the server answered with.
    pub async fn connect_anonymous(
        &self,
    ) -> std::result::Result<WsStream, tokio_tungstenite::tungstenite::Error> {
        let request = self.ws_url().into_client_request()?;
        let (stream, _response) = connect_async(request).await?;
        Ok(stream)
    }
}

/// Read the next text frame as JSON, failing after the timeout
pub async fn next_json(ws: &mut WsStream, timeout_ms: u64) -> Result<Value> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        let frame = tokio::time::timeout_at(deadline, ws.next())
            .await
            .map_err(|_| anyhow::anyhow!("Timed out waiting for a frame"))?
            .ok_or_else(|| anyhow::anyhow!("Websocket closed while waiting for a frame"))??;

        match frame {
            WsMessage::Text(text) => return Ok(serde_json::from_str(&text)?),
            WsMessage::Ping(_) | WsMessage::Pong(_) => continue,
            other => anyhow::bail!("Expected a text frame, got {other:?}"),
        }
    }
}

/// Read frames until a dispatch with the given event type arrives
///
/// Frames for other events are consumed and dropped, so tests can wait
/// for the one they care about without choreographing every broadcast.
pub async fn wait_for_event(ws: &mut WsStream, event_type: &str, timeout_ms: u64) -> Result<Value> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        let frame = tokio::time::timeout_at(deadline, ws.next())
            .await
            .map_err(|_| anyhow::anyhow!("Timed out waiting for {event_type}"))?
            .ok_or_else(|| anyhow::anyhow!("Websocket closed while waiting for {event_type}"))??;

        if let WsMessage::Text(text) = frame {
            let value: Value = serde_json::from_str(&text)?;
            if value["op"] == 0 && value["t"] == event_type {
                return Ok(value);
            }
        }
    }
}

/// Read frames until the close frame arrives, returning its code and reason
pub async fn expect_close(ws: &mut WsStream, timeout_ms: u64) -> Result<(u16, String)> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        let frame = tokio::time::timeout_at(deadline, ws.next())
            .await
            .map_err(|_| anyhow::anyhow!("Timed out waiting for a close frame"))?
            .ok_or_else(|| anyhow::anyhow!("Websocket ended without a close frame"))??;

        match frame {
            WsMessage::Close(Some(close)) => {
                return Ok((close.code.into(), close.reason.to_string()))
            }
            WsMessage::Close(None) => anyhow::bail!("Close frame carried no code"),
            _ => continue,
        }
    }
}

/// Send a JSON value as a text frame
pub async fn send_op(ws: &mut WsStream, value: Value) -> Result<()> {
    ws.send(WsMessage::Text(value.to_string())).await?;
    Ok(())
}

/// Create a test configuration
pub fn test_config() -> Result<AppConfig> {
    // Load from environment or use defaults
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    Ok(config)
}

/// Helper to check if test environment is available
pub async fn check_test_env() -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    if std::env::var("REDIS_URL").is_err() {
        eprintln!("Skipping test: REDIS_URL not set");
        return false;
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
