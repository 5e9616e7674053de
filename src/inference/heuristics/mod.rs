// ABOUTME: Deterministic argument inference - category-specific pattern
// ABOUTME: matching that turns a free-text query into call parameters.

mod confluence;
mod github;
mod jira;
mod webex;

pub use confluence::ConfluenceOperation;
pub use github::{GithubOperation, RepoRef};
pub use jira::{JiraOperation, build_jql};
pub use webex::WebexOperation;

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};

use crate::catalog::Tool;
use crate::transport::InvocationArguments;

static ISSUE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+-[0-9]+").expect("valid issue key regex"));

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("valid quoted text regex"));

static SAYING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bsaying\s+(.+)").expect("valid saying regex"));

static LEADING_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:please\s+)?(?:search|find|look\s*up|look\s+for|list|show(?:\s+me)?|get|fetch)\s+(?:(?:for|about)\s+)?",
    )
    .expect("valid leading verb regex")
});

/// Build arguments for `tool` from `query` using the heuristics of its category.
///
/// Category defaults are applied afterwards and never overwrite a value the
/// heuristic already produced.
pub fn infer(tool: &Tool, query: &str) -> InvocationArguments {
    let generic = tool.is_generic_api();
    let mut args = match tool.category.as_str() {
        "jira" => jira::arguments(query, generic),
        "confluence" => confluence::arguments(query, generic),
        "github" => github::arguments(query, generic),
        "webex" => webex::arguments(query, generic),
        _ => free_text(query),
    };
    apply_defaults(tool, &mut args);
    args
}

/// Fill in category defaults such as result-count caps, keeping any value
/// already present.
pub fn apply_defaults(tool: &Tool, args: &mut InvocationArguments) {
    let generic = tool.is_generic_api();
    match tool.category.as_str() {
        "jira" => jira::apply_defaults(args, generic),
        "confluence" => confluence::apply_defaults(args, generic),
        "github" => github::apply_defaults(args, generic),
        "webex" => webex::apply_defaults(args, generic),
        _ => {}
    }
}

/// Extract the first ticket-style key (`ABC-123`) from a query, uppercased.
pub fn extract_issue_key(query: &str) -> Option<String> {
    ISSUE_KEY
        .find(&query.to_uppercase())
        .map(|m| m.as_str().to_string())
}

/// The call shape expected by tools with the generic REST capability.
#[derive(Debug, Clone, PartialEq)]
pub struct CallShape {
    pub endpoint: String,
    pub method: &'static str,
    pub params: Option<Map<String, Value>>,
    pub body: Option<Value>,
}

impl CallShape {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: "GET",
            params: None,
            body: None,
        }
    }

    pub fn with_body(endpoint: impl Into<String>, method: &'static str, body: Value) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            params: None,
            body: Some(body),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn into_arguments(self) -> InvocationArguments {
        let mut args = Map::new();
        args.insert("endpoint".into(), json!(self.endpoint));
        args.insert("method".into(), json!(self.method));
        if let Some(params) = self.params {
            args.insert("params".into(), Value::Object(params));
        }
        if let Some(body) = self.body {
            args.insert("body".into(), body);
        }
        args
    }
}

/// Default arguments when nothing matched: the raw query as a search term.
pub fn free_text(query: &str) -> InvocationArguments {
    let mut args = Map::new();
    args.insert("query".into(), json!(query.trim()));
    args
}

/// Insert `value` under `key` unless the key is already present.
pub(crate) fn set_if_absent(args: &mut InvocationArguments, key: &str, value: Value) {
    args.entry(key.to_string()).or_insert(value);
}

/// Set a default inside the nested `params` object of a generic call.
pub(crate) fn set_param_if_absent(args: &mut InvocationArguments, key: &str, value: Value) {
    let params = args
        .entry("params".to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(params) = params.as_object_mut() {
        params.entry(key.to_string()).or_insert(value);
    }
}

/// The endpoint and method of a generic call, if the arguments have that shape.
pub(crate) fn endpoint_of(args: &InvocationArguments) -> Option<(&str, &str)> {
    let endpoint = args.get("endpoint")?.as_str()?;
    let method = args.get("method").and_then(Value::as_str).unwrap_or("GET");
    Some((endpoint, method))
}

/// Unwrap a JSON object built with `json!`.
pub(crate) fn into_map(value: Value) -> InvocationArguments {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Whole-word match on an already lowercased string.
pub(crate) fn has_word(lower: &str, word: &str) -> bool {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w == word)
}

/// Free text for a message or comment: quoted text, else text after the
/// first colon, else text after "saying".
pub(crate) fn message_text(query: &str) -> Option<String> {
    if let Some(caps) = QUOTED.captures(query) {
        return Some(caps[1].trim().to_string());
    }
    if let Some((_, after)) = query.split_once(':') {
        let after = after.trim();
        if !after.is_empty() {
            return Some(after.to_string());
        }
    }
    SAYING
        .captures(query)
        .map(|caps| caps[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

/// The query with leading request verbs ("search for", "show me") removed.
pub(crate) fn search_terms(query: &str) -> String {
    let stripped = LEADING_VERB.replace(query, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        query.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Escape a string for a double-quoted JQL/CQL literal.
pub(crate) fn quote_literal(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
