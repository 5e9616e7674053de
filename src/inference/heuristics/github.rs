// ABOUTME: GitHub heuristics - repository, issue and pull request lookups
// ABOUTME: keyed on owner/repo and #number mentions, with search fallback.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use super::{
    CallShape, endpoint_of, has_word, into_map, message_text, search_terms,
    set_if_absent, set_param_if_absent,
};
use crate::transport::InvocationArguments;

const DEFAULT_PER_PAGE: u64 = 30;

static REPO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z0-9][A-Za-z0-9_.-]*)/([A-Za-z0-9][A-Za-z0-9_.-]*)\b")
        .expect("valid repository regex")
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:#|\b(?:issue|pr|pull request|pull)\s+#?)(\d+)\b").expect("valid number regex")
});

/// An owner/repository pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    fn path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GithubOperation {
    GetRepo { repo: RepoRef },
    GetIssue { repo: RepoRef, number: u64 },
    GetPull { repo: RepoRef, number: u64 },
    Comment { repo: RepoRef, number: u64, body: String },
    ListIssues { repo: RepoRef, open_only: bool },
    ListPulls { repo: RepoRef },
    ListCommits { repo: RepoRef },
    SearchIssues { query: String },
    SearchCode { query: String },
}

impl GithubOperation {
    /// Detect the operation a query asks for; `None` for plain free text.
    pub fn detect(query: &str) -> Option<Self> {
        let stripped = query
            .replace("https://github.com/", "")
            .replace("http://github.com/", "");
        let lower = stripped.to_lowercase();
        let wants_pulls = lower.contains("pull request")
            || ["pull", "pulls", "pr", "prs"].iter().any(|w| has_word(&lower, w));

        let Some(repo) = REPO.captures(&stripped).map(|c| RepoRef {
            owner: c[1].to_string(),
            repo: c[2].trim_end_matches('.').to_string(),
        }) else {
            if has_word(&lower, "code") {
                return Some(GithubOperation::SearchCode {
                    query: search_terms(query),
                });
            }
            return None;
        };

        if let Some(number) = NUMBER
            .captures(&stripped)
            .and_then(|c| c[1].parse::<u64>().ok())
        {
            if has_word(&lower, "comment") {
                let body = message_text(query).unwrap_or_else(|| query.trim().to_string());
                return Some(GithubOperation::Comment { repo, number, body });
            }
            return Some(if wants_pulls {
                GithubOperation::GetPull { repo, number }
            } else {
                GithubOperation::GetIssue { repo, number }
            });
        }

        if wants_pulls {
            return Some(GithubOperation::ListPulls { repo });
        }
        if has_word(&lower, "commits") || has_word(&lower, "commit") {
            return Some(GithubOperation::ListCommits { repo });
        }
        if has_word(&lower, "issues") || has_word(&lower, "bugs") {
            return Some(GithubOperation::ListIssues {
                repo,
                open_only: has_word(&lower, "open"),
            });
        }
        Some(GithubOperation::GetRepo { repo })
    }

    pub fn typed_arguments(&self) -> InvocationArguments {
        let value = match self {
            GithubOperation::GetRepo { repo }
            | GithubOperation::ListPulls { repo }
            | GithubOperation::ListCommits { repo } => {
                json!({"owner": repo.owner, "repo": repo.repo})
            }
            GithubOperation::GetIssue { repo, number } => {
                json!({"owner": repo.owner, "repo": repo.repo, "issue_number": number})
            }
            GithubOperation::GetPull { repo, number } => {
                json!({"owner": repo.owner, "repo": repo.repo, "pull_number": number})
            }
            GithubOperation::Comment { repo, number, body } => json!({
                "owner": repo.owner,
                "repo": repo.repo,
                "issue_number": number,
                "body": body,
            }),
            GithubOperation::ListIssues { repo, open_only } => {
                let mut value = json!({"owner": repo.owner, "repo": repo.repo});
                if *open_only {
                    value["state"] = json!("open");
                }
                value
            }
            GithubOperation::SearchIssues { query } | GithubOperation::SearchCode { query } => {
                json!({"query": query})
            }
        };
        into_map(value)
    }

    pub fn call_shape(&self) -> CallShape {
        match self {
            GithubOperation::GetRepo { repo } => CallShape::get(repo.path()),
            GithubOperation::GetIssue { repo, number } => {
                CallShape::get(format!("{}/issues/{}", repo.path(), number))
            }
            GithubOperation::GetPull { repo, number } => {
                CallShape::get(format!("{}/pulls/{}", repo.path(), number))
            }
            GithubOperation::Comment { repo, number, body } => CallShape::with_body(
                format!("{}/issues/{}/comments", repo.path(), number),
                "POST",
                json!({"body": body}),
            ),
            GithubOperation::ListIssues { repo, open_only } => {
                let shape = CallShape::get(format!("{}/issues", repo.path()));
                if *open_only {
                    shape.param("state", "open")
                } else {
                    shape
                }
            }
            GithubOperation::ListPulls { repo } => {
                CallShape::get(format!("{}/pulls", repo.path()))
            }
            GithubOperation::ListCommits { repo } => {
                CallShape::get(format!("{}/commits", repo.path()))
            }
            GithubOperation::SearchIssues { query } => {
                CallShape::get("/search/issues").param("q", query.as_str())
            }
            GithubOperation::SearchCode { query } => {
                CallShape::get("/search/code").param("q", query.as_str())
            }
        }
    }
}

pub(super) fn arguments(query: &str, generic: bool) -> InvocationArguments {
    let operation = GithubOperation::detect(query).unwrap_or_else(|| GithubOperation::SearchIssues {
        query: search_terms(query),
    });
    if generic {
        operation.call_shape().into_arguments()
    } else {
        operation.typed_arguments()
    }
}

pub(super) fn apply_defaults(args: &mut InvocationArguments, generic: bool) {
    if generic {
        let paged = matches!(
            endpoint_of(args),
            Some((endpoint, "GET")) if endpoint.starts_with("/search/")
                || endpoint.ends_with("/issues")
                || endpoint.ends_with("/pulls")
                || endpoint.ends_with("/commits")
        );
        if paged {
            set_param_if_absent(args, "per_page", json!(DEFAULT_PER_PAGE));
        }
    } else if args.contains_key("query") {
        set_if_absent(args, "per_page", json!(DEFAULT_PER_PAGE));
    }
}
