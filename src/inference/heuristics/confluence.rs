// ABOUTME: Confluence heuristics - page lookups by id and CQL searches
// ABOUTME: scoped by space or title.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use super::{
    CallShape, endpoint_of, into_map, quote_literal, search_terms, set_if_absent,
    set_param_if_absent,
};
use crate::transport::InvocationArguments;

const API: &str = "/rest/api/content";
const DEFAULT_LIMIT: u64 = 25;

static PAGE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bpage\s+(?:id\s+)?#?(\d+)\b").expect("valid page id regex")
});

static SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:space)\s+([A-Z][A-Z0-9_]+)\b").expect("valid space regex"));

static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:titled|title|called|named)\s+"([^"]+)""#).expect("valid title regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfluenceOperation {
    GetPage { id: String },
    Search { cql: String },
}

impl ConfluenceOperation {
    /// Detect the operation a query asks for; `None` for plain free text.
    pub fn detect(query: &str) -> Option<Self> {
        if let Some(caps) = PAGE_ID.captures(query) {
            return Some(ConfluenceOperation::GetPage {
                id: caps[1].to_string(),
            });
        }

        let space = SPACE.captures(query).map(|c| c[1].to_string());
        let title = TITLE.captures(query).map(|c| c[1].to_string());
        if space.is_none() && title.is_none() {
            return None;
        }

        let mut clauses = vec!["type = page".to_string()];
        if let Some(space) = space {
            clauses.push(format!("space = {}", quote_literal(&space)));
        }
        match title {
            Some(title) => clauses.push(format!("title ~ {}", quote_literal(&title))),
            None => {
                let terms = SPACE.replace(&search_terms(query), "").trim().to_string();
                if !terms.is_empty() {
                    clauses.push(format!("text ~ {}", quote_literal(&terms)));
                }
            }
        }
        Some(ConfluenceOperation::Search {
            cql: clauses.join(" AND "),
        })
    }

    /// CQL text search over the raw query.
    pub fn text_search(query: &str) -> Self {
        ConfluenceOperation::Search {
            cql: format!("type = page AND text ~ {}", quote_literal(&search_terms(query))),
        }
    }

    pub fn typed_arguments(&self) -> InvocationArguments {
        match self {
            ConfluenceOperation::GetPage { id } => into_map(json!({"page_id": id})),
            ConfluenceOperation::Search { cql } => into_map(json!({"cql": cql})),
        }
    }

    pub fn call_shape(&self) -> CallShape {
        match self {
            ConfluenceOperation::GetPage { id } => {
                CallShape::get(format!("{API}/{id}")).param("expand", "body.storage,version")
            }
            ConfluenceOperation::Search { cql } => {
                CallShape::get(format!("{API}/search")).param("cql", cql.as_str())
            }
        }
    }
}

pub(super) fn arguments(query: &str, generic: bool) -> InvocationArguments {
    let operation = ConfluenceOperation::detect(query)
        .unwrap_or_else(|| ConfluenceOperation::text_search(query));
    if generic {
        operation.call_shape().into_arguments()
    } else {
        operation.typed_arguments()
    }
}

pub(super) fn apply_defaults(args: &mut InvocationArguments, generic: bool) {
    if generic {
        if matches!(endpoint_of(args), Some((endpoint, _)) if endpoint.ends_with("/search")) {
            set_param_if_absent(args, "limit", json!(DEFAULT_LIMIT));
        }
    } else if args.contains_key("cql") {
        set_if_absent(args, "limit", json!(DEFAULT_LIMIT));
    }
}
