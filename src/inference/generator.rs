// ABOUTME: The argument generator port and its LLM-backed implementation,
// ABOUTME: which asks a chat model to turn a query into a call object.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::{LlmClient, Message, Request};
use crate::transport::InvocationArguments;

const SYSTEM_PROMPT: &str = "You translate a user's request into the JSON arguments for a single tool call. \
Reply with one JSON object and nothing else. Use only the call shapes from the reference. \
If the request cannot be expressed as a call to this tool, reply with {}.";

/// What the generator is told about the call it should produce.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub tool_name: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub query: &'a str,
    pub reference: &'a str,
}

/// Turns a natural-language query into structured call arguments.
///
/// `Ok(None)` means the generator had nothing to offer; errors are treated
/// the same way by the pipeline after being logged.
#[async_trait]
pub trait ArgumentGenerator: Send + Sync {
    async fn generate_arguments(
        &self,
        request: GenerationRequest<'_>,
    ) -> anyhow::Result<Option<InvocationArguments>>;
}

/// Generator backed by any [`LlmClient`].
pub struct LlmArgumentGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
}

impl LlmArgumentGenerator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: 1024,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn prompt(request: &GenerationRequest<'_>) -> String {
        format!(
            "Tool: {}\nCategory: {}\nDescription: {}\n\nReference:\n{}\n\nRequest: {}",
            request.tool_name, request.category, request.description, request.reference, request.query
        )
    }
}

#[async_trait]
impl ArgumentGenerator for LlmArgumentGenerator {
    async fn generate_arguments(
        &self,
        request: GenerationRequest<'_>,
    ) -> anyhow::Result<Option<InvocationArguments>> {
        let llm_request = Request::new(&self.model)
            .system(SYSTEM_PROMPT)
            .max_tokens(self.max_tokens)
            .temperature(0.0)
            .message(Message::user(Self::prompt(&request)));

        let response = self.client.create_message(&llm_request).await?;
        Ok(parse_arguments(&response.text))
    }
}

/// Pull a non-empty JSON object out of model output.
///
/// Tolerates markdown code fences and prose around the object.
pub fn parse_arguments(text: &str) -> Option<InvocationArguments> {
    let unfenced = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```");
    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&unfenced[start..=end]) {
        Ok(Value::Object(map)) if !map.is_empty() => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::{Response, Usage};
    use std::sync::Mutex;

    struct CannedLlm {
        reply: String,
        seen: Mutex<Vec<Request>>,
    }

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
            self.seen.lock().unwrap().push(req.clone());
            Ok(Response {
                id: "r1".into(),
                model: req.model.clone(),
                text: self.reply.clone(),
                usage: Usage::default(),
            })
        }
    }

    #[test]
    fn test_parse_plain_object() {
        let args = parse_arguments(r#"{"issue_key": "PROJ-5"}"#).unwrap();
        assert_eq!(args["issue_key"], "PROJ-5");
    }

    #[test]
    fn test_parse_fenced_object_with_prose() {
        let text = "```json\nHere you go: {\"jql\": \"project = X\"}\n```";
        let args = parse_arguments(text).unwrap();
        assert_eq!(args["jql"], "project = X");
    }

    #[test]
    fn test_parse_rejects_empty_and_non_objects() {
        assert!(parse_arguments("{}").is_none());
        assert!(parse_arguments("[1, 2]").is_none());
        assert!(parse_arguments("no json at all").is_none());
        assert!(parse_arguments("} backwards {").is_none());
    }

    #[tokio::test]
    async fn test_llm_generator_sends_reference_and_query() {
        let llm = Arc::new(CannedLlm {
            reply: r#"{"issue_key": "ABC-1"}"#.into(),
            seen: Mutex::new(Vec::new()),
        });
        let generator = LlmArgumentGenerator::new(llm.clone(), "test-model");

        let args = generator
            .generate_arguments(GenerationRequest {
                tool_name: "jira_get_issue",
                description: "Fetch an issue",
                category: "jira",
                query: "show ABC-1",
                reference: "REFERENCE TEXT",
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(args["issue_key"], "ABC-1");

        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen[0].model, "test-model");
        assert_eq!(seen[0].temperature, Some(0.0));
        let prompt = &seen[0].messages[0].content;
        assert!(prompt.contains("REFERENCE TEXT"));
        assert!(prompt.contains("show ABC-1"));
    }
}
