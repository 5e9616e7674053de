// ABOUTME: Ollama API client wrapping OpenAI-compatible API for local LLM inference.
// ABOUTME: Connects to Ollama server (default localhost:11434) with dummy API key.

use async_trait::async_trait;

use super::openai::{OpenAIRequest, post_chat_completion};
use super::{Request, Response};
use crate::error::LlmError;

/// Base URL for Ollama's OpenAI-compatible API.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

/// Default model when none is specified.
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3.2";

/// Client for Ollama API.
/// Ollama runs LLMs locally and exposes an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    http: reqwest::Client,
    default_model: String,
}

impl OllamaClient {
    /// Create a new Ollama client connecting to localhost:11434.
    pub fn new(model: &str) -> Self {
        Self::with_base_url(OLLAMA_BASE_URL, model)
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            default_model: if model.is_empty() {
                OLLAMA_DEFAULT_MODEL.to_string()
            } else {
                model.to_string()
            },
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(OLLAMA_DEFAULT_MODEL)
    }
}

#[async_trait]
impl super::client::LlmClient for OllamaClient {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        let mut openai_req = OpenAIRequest::from(req);

        // Use default model if none specified
        if openai_req.model.is_empty() {
            openai_req.model = self.default_model.clone();
        }

        // Ollama ignores the key but the endpoint expects the header
        post_chat_completion(&self.http, &self.base_url, "ollama", &openai_req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new_empty_model() {
        let client = OllamaClient::new("");
        assert_eq!(client.default_model(), OLLAMA_DEFAULT_MODEL);
        assert_eq!(client.base_url, OLLAMA_BASE_URL);
    }

    #[test]
    fn test_client_with_base_url() {
        let client = OllamaClient::with_base_url("http://gpu-box:11434/v1/", "mistral");
        assert_eq!(client.base_url, "http://gpu-box:11434/v1");
        assert_eq!(client.default_model(), "mistral");
    }
}
