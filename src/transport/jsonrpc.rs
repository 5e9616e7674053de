// ABOUTME: JSON-RPC transport - posts a `tools/call` envelope to the server
// ABOUTME: and returns the raw body, which may be JSON or an event stream.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    AuthScheme, InvocationArguments, Protocol, TimeoutProfile, TransportClient, build_http_client,
    read_body, validate_base_url,
};
use crate::error::TransportError;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// Parameters for `tools/call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: InvocationArguments,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Build a `tools/call` request.
    pub fn tool_call(
        id: u64,
        name: impl Into<String>,
        arguments: InvocationArguments,
    ) -> Result<Self, serde_json::Error> {
        let params = serde_json::to_value(ToolCallParams {
            name: name.into(),
            arguments,
        })?;
        Ok(Self::new(id, "tools/call", Some(params)))
    }
}

/// JSON-RPC transport client.
///
/// Every call is a `POST` to the base URL. Servers may answer with plain JSON
/// or wrap it in an event-stream frame, so both are advertised in `Accept`.
pub struct JsonRpcClient {
    base_url: String,
    auth: AuthScheme,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client for the server at `base_url`.
    pub fn new(
        base_url: &str,
        auth: AuthScheme,
        timeouts: TimeoutProfile,
    ) -> Result<Self, TransportError> {
        validate_base_url(base_url)?;
        Ok(Self {
            base_url: base_url.to_string(),
            auth,
            http_client: build_http_client(timeouts)?,
            next_id: AtomicU64::new(1),
        })
    }

    /// Allocate the next request id.
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportClient for JsonRpcClient {
    fn protocol(&self) -> Protocol {
        Protocol::JsonRpc
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn invoke(
        &self,
        tool_name: &str,
        arguments: &InvocationArguments,
    ) -> Result<String, TransportError> {
        let request = JsonRpcRequest::tool_call(self.next_id(), tool_name, arguments.clone())
            .map_err(|e| TransportError::Configuration(format!("Unserializable arguments: {}", e)))?;

        tracing::debug!(
            url = %self.base_url,
            tool = tool_name,
            id = request.id,
            "Sending JSON-RPC tools/call"
        );

        let builder = self
            .http_client
            .post(&self.base_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json, text/event-stream")
            .json(&request);

        let response = self.auth.apply(builder).send().await?;
        read_body(response).await
    }
}
