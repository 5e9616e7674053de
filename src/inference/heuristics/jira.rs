// ABOUTME: Jira heuristics - detects the issue operation a query asks for
// ABOUTME: and builds either typed or generic REST arguments for it.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use super::{
    CallShape, contains_any, endpoint_of, extract_issue_key, has_word, into_map, message_text,
    quote_literal, search_terms, set_if_absent, set_param_if_absent,
};
use crate::transport::InvocationArguments;

const API: &str = "/rest/api/2";
const DEFAULT_MAX_RESULTS: u64 = 50;

static ASSIGNEE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bassign\w*\b.*?\bto\s+@?([A-Za-z0-9._@-]+)").expect("valid assignee regex")
});

static FIELD_UPDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b(?:set|update|change)\s+(?:the\s+)?(?:[A-Z]+-\d+\s+)?([a-z_]+)(?:\s+(?:of|on|for)\s+[A-Z]+-\d+)?\s+to\s+"?([^"]+?)"?\s*$"#,
    )
    .expect("valid field update regex")
});

static PROJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:project)\s+([A-Z][A-Z0-9_]+)\b").expect("valid project regex")
});

/// An operation on the issue tracker, as detected from a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JiraOperation {
    GetIssue { key: String },
    Search { jql: String },
    AddComment { key: String, body: String },
    UpdateField { key: String, field: String, value: String },
    Assign { key: String, assignee: String },
    GetTransitions { key: String },
}

impl JiraOperation {
    /// Detect the operation a query asks for.
    ///
    /// Returns `None` when the query names no issue and carries no search
    /// criteria beyond free text.
    pub fn detect(query: &str) -> Option<Self> {
        let lower = query.to_lowercase();
        let Some(key) = extract_issue_key(query) else {
            let jql = build_jql(query);
            return (!jql.starts_with("text ~")).then_some(JiraOperation::Search { jql });
        };

        // Status changes go through the workflow, so list its transitions
        if contains_any(&lower, &["transition", "workflow", "valid status", "available status"]) {
            return Some(JiraOperation::GetTransitions { key });
        }

        if contains_any(&lower, &["comment", "annotate", "add a note", "add note"]) {
            let body = message_text(query).unwrap_or_else(|| query.trim().to_string());
            return Some(JiraOperation::AddComment { key, body });
        }

        if lower.contains("assign") {
            if let Some(caps) = ASSIGNEE.captures(query) {
                let assignee = caps[1].trim_end_matches(['.', ',', '!']).to_string();
                return Some(JiraOperation::Assign { key, assignee });
            }
        }

        if contains_any(&lower, &["update", "set ", "change"]) {
            if let Some(caps) = FIELD_UPDATE.captures(query) {
                let field = caps[1].to_lowercase();
                if field != "status" {
                    return Some(JiraOperation::UpdateField {
                        key,
                        field,
                        value: caps[2].trim().to_string(),
                    });
                }
            }
            if lower.contains("status") {
                return Some(JiraOperation::GetTransitions { key });
            }
        }

        Some(JiraOperation::GetIssue { key })
    }

    /// Arguments for tools that take typed parameters.
    pub fn typed_arguments(&self) -> InvocationArguments {
        let value = match self {
            JiraOperation::GetIssue { key } | JiraOperation::GetTransitions { key } => {
                json!({"issue_key": key})
            }
            JiraOperation::Search { jql } => json!({"jql": jql}),
            JiraOperation::AddComment { key, body } => json!({"issue_key": key, "comment": body}),
            JiraOperation::UpdateField { key, field, value } => {
                json!({"issue_key": key, "fields": {field.as_str(): value}})
            }
            JiraOperation::Assign { key, assignee } => {
                json!({"issue_key": key, "assignee": assignee})
            }
        };
        into_map(value)
    }

    /// Endpoint, method and payload for tools with the generic REST capability.
    pub fn call_shape(&self) -> CallShape {
        match self {
            JiraOperation::GetIssue { key } => CallShape::get(format!("{API}/issue/{key}")),
            JiraOperation::Search { jql } => {
                CallShape::get(format!("{API}/search")).param("jql", jql.as_str())
            }
            JiraOperation::AddComment { key, body } => CallShape::with_body(
                format!("{API}/issue/{key}/comment"),
                "POST",
                json!({"body": body}),
            ),
            JiraOperation::UpdateField { key, field, value } => CallShape::with_body(
                format!("{API}/issue/{key}"),
                "PUT",
                json!({"fields": {field.as_str(): value}}),
            ),
            JiraOperation::Assign { key, assignee } => CallShape::with_body(
                format!("{API}/issue/{key}/assignee"),
                "PUT",
                json!({"name": assignee}),
            ),
            JiraOperation::GetTransitions { key } => {
                CallShape::get(format!("{API}/issue/{key}/transitions"))
            }
        }
    }
}

/// Build a JQL query from the criteria mentioned in free text.
///
/// Falls back to a text search over the query's terms when no structured
/// criteria are recognized. Results are always ordered by last update.
pub fn build_jql(query: &str) -> String {
    let lower = query.to_lowercase();
    let mut clauses = Vec::new();

    if let Some(caps) = PROJECT.captures(query) {
        clauses.push(format!("project = {}", &caps[1]));
    }

    if contains_any(&lower, &["assigned to me", "my issues", "my tickets", "my open", "my bugs"]) {
        clauses.push("assignee = currentUser()".to_string());
    }

    if lower.contains("in progress") {
        clauses.push("status = \"In Progress\"".to_string());
    } else if has_word(&lower, "open") || has_word(&lower, "unresolved") {
        clauses.push("resolution = Unresolved".to_string());
    } else if ["done", "closed", "resolved"].iter().any(|w| has_word(&lower, w)) {
        clauses.push("statusCategory = Done".to_string());
    }

    if has_word(&lower, "bug") || has_word(&lower, "bugs") {
        clauses.push("issuetype = Bug".to_string());
    }

    if clauses.is_empty() {
        clauses.push(format!("text ~ {}", quote_literal(&search_terms(query))));
    }

    format!("{} ORDER BY updated DESC", clauses.join(" AND "))
}

pub(super) fn arguments(query: &str, generic: bool) -> InvocationArguments {
    let operation = JiraOperation::detect(query).unwrap_or_else(|| JiraOperation::Search {
        jql: build_jql(query),
    });
    if generic {
        operation.call_shape().into_arguments()
    } else {
        operation.typed_arguments()
    }
}

pub(super) fn apply_defaults(args: &mut InvocationArguments, generic: bool) {
    if generic {
        if matches!(endpoint_of(args), Some((endpoint, _)) if endpoint.ends_with("/search")) {
            set_param_if_absent(args, "maxResults", json!(DEFAULT_MAX_RESULTS));
        }
    } else if args.contains_key("jql") {
        set_if_absent(args, "max_results", json!(DEFAULT_MAX_RESULTS));
    }
}
