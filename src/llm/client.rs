// ABOUTME: Defines the LlmClient trait - the abstraction layer that lets the
// ABOUTME: generated-arguments tier work with any chat completion provider.

use async_trait::async_trait;

use super::{Request, Response};
use crate::error::LlmError;

/// Trait for LLM client implementations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Create a message (non-streaming).
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError>;
}
