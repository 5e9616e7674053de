// ABOUTME: Transport module - HTTP clients that deliver a tool call to a
// ABOUTME: remote server, one client per category, in JSON-RPC or REST shape.

mod jsonrpc;
mod registry;
mod rest;

pub use jsonrpc::{JsonRpcClient, JsonRpcRequest, ToolCallParams};
pub use registry::TransportRegistry;
pub use rest::RestClient;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Flat key/value bag passed to a remote tool.
pub type InvocationArguments = serde_json::Map<String, serde_json::Value>;

/// Wire protocol spoken by a transport client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// `tools/call` JSON-RPC envelope; replies may be event-stream framed.
    #[default]
    JsonRpc,
    /// `POST <base>/mcp/tools/<name>` with the arguments as body.
    Rest,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::JsonRpc => write!(f, "json-rpc"),
            Protocol::Rest => write!(f, "rest"),
        }
    }
}

/// How a client authenticates against its server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthScheme {
    #[default]
    None,
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// A provider-specific token header.
    Header { name: String, value: String },
}

impl AuthScheme {
    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            AuthScheme::None => request,
            AuthScheme::Bearer(token) => request.bearer_auth(token),
            AuthScheme::Header { name, value } => request.header(name.as_str(), value.as_str()),
        }
    }
}

/// Connect and response timeouts for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutProfile {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for TimeoutProfile {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(30),
        }
    }
}

/// A client bound to one remote server.
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// The protocol this client speaks, so replies can be unwrapped correctly.
    fn protocol(&self) -> Protocol;

    /// The server this client is bound to.
    fn base_url(&self) -> &str;

    /// Send one tool call and return the raw response body.
    async fn invoke(
        &self,
        tool_name: &str,
        arguments: &InvocationArguments,
    ) -> Result<String, TransportError>;
}

fn build_http_client(timeouts: TimeoutProfile) -> Result<reqwest::Client, TransportError> {
    reqwest::Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .redirect(reqwest::redirect::Policy::limited(10))
        .user_agent(format!("toolrun/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| TransportError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

fn validate_base_url(url: &str) -> Result<(), TransportError> {
    reqwest::Url::parse(url)
        .map(|_| ())
        .map_err(|e| TransportError::Configuration(format!("Invalid URL '{}': {}", url, e)))
}

/// Read the body, turning non-2xx statuses into errors that keep the body.
async fn read_body(response: reqwest::Response) -> Result<String, TransportError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::Network(format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
