// ABOUTME: OpenAI chat completions client implementation.
// ABOUTME: Implements LlmClient for OpenAI and OpenAI-compatible endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Message, Request, Response, Role, Usage};
use crate::error::LlmError;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// OpenAI API request format.
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// OpenAI message format.
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub id: String,
    pub model: String,
    pub choices: Vec<OpenAIChoice>,
    pub usage: Option<OpenAIUsage>,
}

/// OpenAI response choice.
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

/// OpenAI usage stats.
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// OpenAI API error response.
#[derive(Debug, Deserialize)]
pub struct OpenAIError {
    pub error: OpenAIErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIErrorDetail {
    pub message: String,
}

impl From<&Message> for OpenAIMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        OpenAIMessage {
            role: role.to_string(),
            content: Some(msg.content.clone()),
        }
    }
}

impl From<&Request> for OpenAIRequest {
    fn from(req: &Request) -> Self {
        let mut messages = Vec::new();

        if let Some(ref system) = req.system {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
            });
        }
        messages.extend(req.messages.iter().map(OpenAIMessage::from));

        OpenAIRequest {
            model: req.model.clone(),
            messages,
            max_tokens: req.max_tokens,
            temperature: req.temperature,
        }
    }
}

impl From<OpenAIResponse> for Response {
    fn from(resp: OpenAIResponse) -> Self {
        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let usage = resp
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Response {
            id: resp.id,
            model: resp.model,
            text,
            usage,
        }
    }
}

/// Client for the OpenAI API or any server exposing the same chat completions shape.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Create a new OpenAI client from the OPENAI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            LlmError::Configuration("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Point the client at a different OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Send a chat completion request to an OpenAI-compatible endpoint.
pub(crate) async fn post_chat_completion(
    http: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    req: &OpenAIRequest,
) -> Result<Response, LlmError> {
    let url = format!("{}/chat/completions", base_url);

    let response = http
        .post(&url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(req)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<OpenAIError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        return Err(LlmError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let openai_resp: OpenAIResponse = response.json().await?;
    Ok(Response::from(openai_resp))
}

#[async_trait]
impl super::client::LlmClient for OpenAIClient {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        let openai_req = OpenAIRequest::from(req);
        post_chat_completion(&self.http, &self.base_url, &self.api_key, &openai_req).await
    }
}

#[cfg(test)]
mod openai_test {
    use super::*;

    #[test]
    fn test_client_from_env_missing() {
        // SAFETY: This test runs in isolation and only affects this process
        unsafe {
            std::env::remove_var("OPENAI_API_KEY");
        }
        let result = OpenAIClient::from_env();
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[test]
    fn test_request_serialization() {
        let req = Request::new("gpt-4o-mini")
            .message(Message::user("Hello"))
            .system("Be helpful")
            .max_tokens(100);

        let openai_req = OpenAIRequest::from(&req);
        assert_eq!(openai_req.model, "gpt-4o-mini");
        assert_eq!(openai_req.messages.len(), 2); // system + user
        assert_eq!(openai_req.messages[0].role, "system");
        assert_eq!(openai_req.messages[1].role, "user");

        let json = serde_json::to_value(&openai_req).unwrap();
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_response_conversion() {
        let resp: OpenAIResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": "{\"jql\": \"x\"}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 4}
        }))
        .unwrap();

        let response = Response::from(resp);
        assert_eq!(response.text, "{\"jql\": \"x\"}");
        assert_eq!(response.usage.output_tokens, 4);
    }

    #[test]
    fn test_with_base_url() {
        let client = OpenAIClient::new("k").with_base_url("http://localhost:8000/v1/");
        assert_eq!(client.base_url(), "http://localhost:8000/v1");
    }
}
