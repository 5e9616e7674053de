// ABOUTME: Task input and report types for the executor - per-tool results
// ABOUTME: and the aggregated execution report returned to callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::inference::ArgumentSource;
use crate::transport::InvocationArguments;

/// A request to run a set of tools against one natural-language query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRequest {
    /// Overrides the executor's configured agent name when set.
    pub agent_name: Option<String>,
    pub allowed_tools: Vec<String>,
    pub query: String,
    pub explicit_inputs: InvocationArguments,
}

impl TaskRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Allow a tool. Tools run in the order they are added.
    pub fn tool(mut self, name: impl Into<String>) -> Self {
        self.allowed_tools.push(name.into());
        self
    }

    pub fn tools<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tools.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add an explicit input. Any explicit input bypasses argument inference.
    pub fn input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.explicit_inputs.insert(key.into(), value.into());
        self
    }

    pub fn agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationStatus {
    Success,
    Error,
}

/// The outcome of calling one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocationResult {
    pub tool_name: String,
    pub status: InvocationStatus,
    pub output: Value,
    pub duration_ms: u64,
    /// The arguments actually sent.
    pub arguments: InvocationArguments,
    pub argument_source: ArgumentSource,
}

impl ToolInvocationResult {
    pub fn is_success(&self) -> bool {
        self.status == InvocationStatus::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Failed,
}

/// Aggregated outcome of one task run.
///
/// `tool_results` follows the order of the task's allowed tools, minus the
/// names the catalog did not know, which are listed in `skipped_tools`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub run_id: Uuid,
    pub agent_name: String,
    pub status: RunStatus,
    pub aggregated_text: String,
    pub tool_results: Vec<ToolInvocationResult>,
    pub skipped_tools: Vec<String>,
    pub total_duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionReport {
    /// A report for a run that failed before any tool was called.
    pub fn failed(run_id: Uuid, agent_name: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            run_id,
            agent_name: agent_name.into(),
            status: RunStatus::Failed,
            aggregated_text: format!("Run failed: {}", error),
            tool_results: Vec::new(),
            skipped_tools: Vec::new(),
            total_duration_ms: 0,
            error: Some(error),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn success_count(&self) -> usize {
        self.tool_results.iter().filter(|r| r.is_success()).count()
    }

    pub fn error_count(&self) -> usize {
        self.tool_results.len() - self.success_count()
    }

    /// Look up a result by tool name.
    pub fn result(&self, tool_name: &str) -> Option<&ToolInvocationResult> {
        self.tool_results.iter().find(|r| r.tool_name == tool_name)
    }
}
