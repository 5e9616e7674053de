// ABOUTME: Normalizes JSON-RPC (optionally event-stream framed) and REST
// ABOUTME: replies into success, remote error, empty, or malformed outcomes.

use serde_json::Value;

use crate::transport::Protocol;

/// Longest slice of a raw body kept when reporting a malformed reply.
const PREVIEW_LIMIT: usize = 512;

/// The outcome of unwrapping one raw reply.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResponse {
    /// The call succeeded; carries `result`, or the whole payload if there is none.
    Success(Value),

    /// The server reported a JSON-RPC style `error`.
    RemoteError {
        message: String,
        code: i64,
        data: Option<Value>,
    },

    /// The call reached the tool but the tool flagged its own result as an error.
    ToolError(Value),

    /// The body was empty or absent.
    Empty,

    /// The payload could not be parsed as JSON.
    Malformed { reason: String, preview: String },
}

impl NormalizedResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, NormalizedResponse::Success(_) | NormalizedResponse::Empty)
    }
}

/// Unwrap a raw reply produced by a client speaking `protocol`.
pub fn normalize(raw: Option<&str>, protocol: Protocol) -> NormalizedResponse {
    let Some(raw) = raw else {
        return NormalizedResponse::Empty;
    };
    if raw.trim().is_empty() {
        return NormalizedResponse::Empty;
    }

    let payload = match protocol {
        Protocol::JsonRpc => extract_payload(raw),
        // REST bodies are plain JSON of any shape
        Protocol::Rest => raw.trim().to_string(),
    };

    match serde_json::from_str::<Value>(&payload) {
        Ok(value) => interpret(value),
        Err(e) => NormalizedResponse::Malformed {
            reason: e.to_string(),
            preview: preview(raw),
        },
    }
}

/// Whether the body starts with an event-stream frame.
pub fn is_event_stream(raw: &str) -> bool {
    raw.lines()
        .map(|line| line.trim_end_matches('\r'))
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| {
            ["event:", "data:", "id:", "retry:", ":"]
                .iter()
                .any(|prefix| line.starts_with(prefix))
        })
}

/// Pull the JSON payload out of a JSON-RPC reply.
///
/// Event-stream bodies yield the `data: ` lines of the first event that has
/// any, joined with newlines. Bodies that are a bare JSON object yield
/// themselves. Anything else yields the empty object.
pub fn extract_payload(raw: &str) -> String {
    if is_event_stream(raw) {
        let mut data: Vec<&str> = Vec::new();
        for line in raw.lines().map(|line| line.trim_end_matches('\r')) {
            if let Some(rest) = line.strip_prefix("data: ") {
                data.push(rest);
            } else if line.is_empty() && !data.is_empty() {
                break;
            }
        }
        if !data.is_empty() {
            return data.join("\n");
        }
    }

    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }
    "{}".to_string()
}

fn interpret(payload: Value) -> NormalizedResponse {
    if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
        return remote_error(error);
    }

    let output = match payload {
        Value::Object(mut map) if map.contains_key("result") => {
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    };

    if output.get("isError").and_then(Value::as_bool) == Some(true) {
        return NormalizedResponse::ToolError(output);
    }
    NormalizedResponse::Success(output)
}

fn remote_error(error: &Value) -> NormalizedResponse {
    if let Some(message) = error.as_str() {
        return NormalizedResponse::RemoteError {
            message: message.to_string(),
            code: -1,
            data: None,
        };
    }

    NormalizedResponse::RemoteError {
        message: error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string(),
        code: error.get("code").and_then(Value::as_i64).unwrap_or(-1),
        data: error.get("data").cloned(),
    }
}

fn preview(raw: &str) -> String {
    if raw.len() <= PREVIEW_LIMIT {
        return raw.to_string();
    }
    let mut end = PREVIEW_LIMIT;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &raw[..end])
}

/// Flatten a tool output into readable text.
///
/// MCP-style outputs render their `content` text blocks; strings render as
/// themselves; anything else is pretty-printed JSON.
pub fn render_text(output: &Value) -> String {
    if let Some(blocks) = output.get("content").and_then(Value::as_array) {
        let parts: Vec<String> = blocks
            .iter()
            .filter_map(|block| match block.get("type").and_then(Value::as_str) {
                Some("text") => block.get("text").and_then(Value::as_str).map(str::to_string),
                Some("image") => Some(format!(
                    "[Image: {}]",
                    block
                        .get("mimeType")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                )),
                _ => None,
            })
            .collect();
        if !parts.is_empty() {
            return parts.join("\n");
        }
    }

    match output {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
