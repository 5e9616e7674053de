// ABOUTME: REST transport - posts the argument map as the JSON body to
// ABOUTME: `<base>/mcp/tools/<name>`, authenticating with a provider header.

use async_trait::async_trait;

use super::{
    AuthScheme, InvocationArguments, Protocol, TimeoutProfile, TransportClient, build_http_client,
    read_body, validate_base_url,
};
use crate::error::TransportError;

/// REST transport client.
///
/// Replies are plain JSON or empty, never event-stream framed.
pub struct RestClient {
    base_url: String,
    auth: AuthScheme,
    http_client: reqwest::Client,
}

impl RestClient {
    /// Create a client for the server at `base_url`.
    pub fn new(
        base_url: &str,
        auth: AuthScheme,
        timeouts: TimeoutProfile,
    ) -> Result<Self, TransportError> {
        validate_base_url(base_url)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            http_client: build_http_client(timeouts)?,
        })
    }

    /// URL a tool call is posted to.
    pub fn tool_url(&self, tool_name: &str) -> String {
        format!(
            "{}/mcp/tools/{}",
            self.base_url,
            urlencoding::encode(tool_name)
        )
    }
}

#[async_trait]
impl TransportClient for RestClient {
    fn protocol(&self) -> Protocol {
        Protocol::Rest
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn invoke(
        &self,
        tool_name: &str,
        arguments: &InvocationArguments,
    ) -> Result<String, TransportError> {
        let url = self.tool_url(tool_name);
        tracing::debug!(url = %url, tool = tool_name, "Sending REST tool call");

        let builder = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(arguments);

        let response = self.auth.apply(builder).send().await?;
        read_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RestClient {
        RestClient::new(
            base,
            AuthScheme::Header {
                name: "X-Webex-Token".into(),
                value: "secret".into(),
            },
            TimeoutProfile::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_tool_url() {
        let client = client("https://tools.example.com/");
        assert_eq!(
            client.tool_url("webex_send_message"),
            "https://tools.example.com/mcp/tools/webex_send_message"
        );
        assert_eq!(client.base_url(), "https://tools.example.com");
    }

    #[test]
    fn test_tool_url_escapes_name() {
        let client = client("https://tools.example.com");
        assert_eq!(
            client.tool_url("a b/c"),
            "https://tools.example.com/mcp/tools/a%20b%2Fc"
        );
    }

    #[test]
    fn test_protocol() {
        assert_eq!(client("http://localhost:9000").protocol(), Protocol::Rest);
    }
}
