// ABOUTME: Webex heuristics - sending messages to a room and listing rooms
// ABOUTME: or recent messages.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use super::{
    CallShape, contains_any, endpoint_of, has_word, into_map, message_text, set_if_absent,
    set_param_if_absent,
};
use crate::transport::InvocationArguments;

const API: &str = "/v1";
const DEFAULT_MAX: u64 = 50;

static ROOM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:room|space)\s+([A-Za-z0-9_=-]+)").expect("valid room regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebexOperation {
    SendMessage { room: Option<String>, text: String },
    ListRooms,
    ListMessages { room: String },
}

impl WebexOperation {
    /// Detect the operation a query asks for; `None` for plain free text.
    pub fn detect(query: &str) -> Option<Self> {
        let lower = query.to_lowercase();
        let room = ROOM.captures(query).map(|c| c[1].to_string());

        if contains_any(&lower, &["send", "post ", "notify", "tell ", "message to"]) {
            let text = message_text(query).unwrap_or_else(|| query.trim().to_string());
            return Some(WebexOperation::SendMessage { room, text });
        }

        if has_word(&lower, "rooms") || has_word(&lower, "spaces") {
            return Some(WebexOperation::ListRooms);
        }

        if has_word(&lower, "messages") {
            if let Some(room) = room {
                return Some(WebexOperation::ListMessages { room });
            }
        }
        None
    }

    pub fn typed_arguments(&self) -> InvocationArguments {
        match self {
            WebexOperation::SendMessage { room, text } => {
                let mut args = into_map(json!({"text": text}));
                if let Some(room) = room {
                    args.insert("room".into(), json!(room));
                }
                args
            }
            WebexOperation::ListRooms => InvocationArguments::new(),
            WebexOperation::ListMessages { room } => into_map(json!({"room": room})),
        }
    }

    pub fn call_shape(&self) -> CallShape {
        match self {
            WebexOperation::SendMessage { room, text } => {
                let mut body = json!({"text": text});
                if let Some(room) = room {
                    body["roomId"] = json!(room);
                }
                CallShape::with_body(format!("{API}/messages"), "POST", body)
            }
            WebexOperation::ListRooms => CallShape::get(format!("{API}/rooms")),
            WebexOperation::ListMessages { room } => {
                CallShape::get(format!("{API}/messages")).param("roomId", room.as_str())
            }
        }
    }
}

pub(super) fn arguments(query: &str, generic: bool) -> InvocationArguments {
    match WebexOperation::detect(query) {
        Some(operation) if generic => operation.call_shape().into_arguments(),
        Some(operation) => operation.typed_arguments(),
        None => super::free_text(query),
    }
}

pub(super) fn apply_defaults(args: &mut InvocationArguments, generic: bool) {
    if generic {
        if matches!(endpoint_of(args), Some((_, "GET"))) {
            set_param_if_absent(args, "max", json!(DEFAULT_MAX));
        }
    } else if !args.contains_key("text") {
        set_if_absent(args, "max", json!(DEFAULT_MAX));
    }
}
