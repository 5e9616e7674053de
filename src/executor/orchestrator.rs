// ABOUTME: The Executor - resolves each allowed tool, infers its arguments,
// ABOUTME: invokes it over its category's transport, and aggregates a report.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde_json::{Value, json};
use tracing::Instrument;
use uuid::Uuid;

use super::{ExecutionReport, InvocationStatus, RunStatus, TaskRequest, ToolInvocationResult};
use crate::catalog::{Catalog, Tool};
use crate::config::{GeneratorKind, InferenceConfig, ToolrunConfig};
use crate::error::{ToolrunError, TransportError};
use crate::inference::{ArgumentGenerator, ArgumentPipeline, LlmArgumentGenerator};
use crate::llm::{OllamaClient, OpenAIClient};
use crate::response::{NormalizedResponse, normalize, render_text};
use crate::transport::{InvocationArguments, TransportRegistry};

const DEFAULT_AGENT_NAME: &str = "toolrun";

/// Runs tasks against the catalog.
///
/// Per-tool failures become error results and never stop the run. Tools run
/// one at a time unless `max_concurrency` is raised, and results always come
/// back in the order the task listed them.
#[derive(Clone)]
pub struct Executor {
    catalog: Catalog,
    transports: TransportRegistry,
    pipeline: ArgumentPipeline,
    agent_name: String,
    max_concurrency: usize,
}

impl Executor {
    pub fn new(catalog: Catalog, transports: TransportRegistry) -> Self {
        Self {
            catalog,
            transports,
            pipeline: ArgumentPipeline::new(),
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            max_concurrency: 1,
        }
    }

    /// Build an executor from loaded configuration.
    ///
    /// Transports and the argument generator come from the config; the
    /// catalog is passed in so callers decide how it is populated.
    pub fn from_config(config: &ToolrunConfig, catalog: Catalog) -> Result<Self, ToolrunError> {
        let transports = TransportRegistry::from_config(&config.transports)?;
        let mut pipeline = ArgumentPipeline::new();
        if let Some(generator) = build_generator(&config.inference)? {
            pipeline = pipeline.with_generator(generator);
        }

        Ok(Self::new(catalog, transports)
            .with_pipeline(pipeline)
            .with_agent_name(&config.executor.agent_name)
            .with_max_concurrency(config.executor.max_concurrency))
    }

    pub fn with_pipeline(mut self, pipeline: ArgumentPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_agent_name(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = agent_name.into();
        self
    }

    /// Allow up to `max` tools of one run in flight at once. Clamped to at least 1.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn transports(&self) -> &TransportRegistry {
        &self.transports
    }

    /// Run `allowed_tools` for `query`.
    pub async fn execute_task(
        &self,
        allowed_tools: &[String],
        query: &str,
        explicit_inputs: &InvocationArguments,
    ) -> ExecutionReport {
        let task = TaskRequest {
            agent_name: None,
            allowed_tools: allowed_tools.to_vec(),
            query: query.to_string(),
            explicit_inputs: explicit_inputs.clone(),
        };
        self.execute(&task).await
    }

    /// Run a task and build its report.
    pub async fn execute(&self, task: &TaskRequest) -> ExecutionReport {
        let run_id = Uuid::new_v4();
        let agent_name = task
            .agent_name
            .clone()
            .unwrap_or_else(|| self.agent_name.clone());
        let span = tracing::info_span!("run", %run_id, agent = %agent_name);

        self.run(run_id, agent_name, task).instrument(span).await
    }

    async fn run(&self, run_id: Uuid, agent_name: String, task: &TaskRequest) -> ExecutionReport {
        let started = Instant::now();

        if let Err(reason) = validate_task(&agent_name, task) {
            tracing::warn!(error = %reason, "Rejecting task");
            return ExecutionReport::failed(run_id, agent_name, reason);
        }

        let mut tools = Vec::with_capacity(task.allowed_tools.len());
        let mut skipped = Vec::new();
        for name in &task.allowed_tools {
            match self.catalog.lookup(name).await {
                Some(tool) => tools.push(tool),
                None => {
                    tracing::debug!(tool = %name, "Tool not in catalog; skipping");
                    skipped.push(name.clone());
                }
            }
        }

        tracing::info!(
            tools = tools.len(),
            skipped = skipped.len(),
            concurrency = self.max_concurrency,
            "Starting run"
        );

        let results: Vec<ToolInvocationResult> = stream::iter(tools)
            .map(|tool| self.invoke_tool(tool, &task.query, &task.explicit_inputs))
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let report = ExecutionReport {
            run_id,
            agent_name,
            status: RunStatus::Completed,
            aggregated_text: aggregate_text(&results),
            tool_results: results,
            skipped_tools: skipped,
            total_duration_ms: elapsed_ms(started),
            error: None,
        };

        tracing::info!(
            succeeded = report.success_count(),
            failed = report.error_count(),
            duration_ms = report.total_duration_ms,
            "Run finished"
        );
        report
    }

    async fn invoke_tool(
        &self,
        tool: Tool,
        query: &str,
        explicit: &InvocationArguments,
    ) -> ToolInvocationResult {
        let span = tracing::info_span!("tool", tool = %tool.name, category = %tool.category);
        async move {
            let resolved = self.pipeline.build_arguments(&tool, query, explicit).await;
            let started = Instant::now();

            let (status, output) = match self.transports.client_for(&tool.category) {
                None => {
                    tracing::warn!("No transport configured for category");
                    (
                        InvocationStatus::Error,
                        json!({
                            "error": format!("No transport configured for category '{}'", tool.category),
                            "category": tool.category,
                        }),
                    )
                }
                Some(client) => match client.invoke(tool.remote_name(), &resolved.arguments).await {
                    Ok(raw) => outcome(normalize(Some(raw.as_str()), client.protocol())),
                    Err(e) => {
                        tracing::warn!(error = %e, "Tool call failed");
                        (InvocationStatus::Error, transport_error_output(&e))
                    }
                },
            };

            let duration_ms = elapsed_ms(started);
            tracing::debug!(?status, duration_ms, "Tool call finished");

            ToolInvocationResult {
                tool_name: tool.name,
                status,
                output,
                duration_ms,
                arguments: resolved.arguments,
                argument_source: resolved.source,
            }
        }
        .instrument(span)
        .await
    }
}

fn build_generator(
    config: &InferenceConfig,
) -> Result<Option<Arc<dyn ArgumentGenerator>>, ToolrunError> {
    let generator = match config.generator {
        GeneratorKind::None => return Ok(None),
        GeneratorKind::OpenAi => {
            let mut client = OpenAIClient::from_env()?;
            if let Some(base_url) = &config.base_url {
                client = client.with_base_url(base_url);
            }
            LlmArgumentGenerator::new(Arc::new(client), &config.model)
        }
        GeneratorKind::Ollama => {
            let client = match &config.base_url {
                Some(base_url) => OllamaClient::with_base_url(base_url, &config.model),
                None => OllamaClient::new(&config.model),
            };
            let model = client.default_model().to_string();
            LlmArgumentGenerator::new(Arc::new(client), model)
        }
    };
    let generator: Arc<dyn ArgumentGenerator> = Arc::new(generator);
    Ok(Some(generator))
}

fn validate_task(agent_name: &str, task: &TaskRequest) -> Result<(), String> {
    if agent_name.trim().is_empty() {
        return Err("agent name must not be empty".to_string());
    }
    if task.query.trim().is_empty() && task.explicit_inputs.is_empty() {
        return Err("task has neither a query nor explicit inputs".to_string());
    }
    Ok(())
}

/// Map a normalized reply onto a result status and output.
fn outcome(response: NormalizedResponse) -> (InvocationStatus, Value) {
    match response {
        NormalizedResponse::Success(output) => (InvocationStatus::Success, output),
        NormalizedResponse::Empty => (
            InvocationStatus::Success,
            json!({
                "empty_response": true,
                "message": "Remote server returned an empty response",
            }),
        ),
        NormalizedResponse::RemoteError {
            message,
            code,
            data,
        } => {
            let mut output = json!({"error": message, "code": code});
            if let Some(data) = data {
                output["data"] = data;
            }
            (InvocationStatus::Error, output)
        }
        NormalizedResponse::ToolError(result) => (
            InvocationStatus::Error,
            json!({"error": render_text(&result), "result": result}),
        ),
        NormalizedResponse::Malformed { reason, preview } => (
            InvocationStatus::Error,
            json!({"error": format!("Malformed response: {}", reason), "preview": preview}),
        ),
    }
}

fn transport_error_output(error: &TransportError) -> Value {
    let mut output = json!({"error": error.to_string()});
    if let Some(status) = error.status() {
        output["status"] = json!(status);
    }
    if let Some(body) = error.body() {
        output["body"] = json!(body);
    }
    output
}

/// One section per result, in report order.
fn aggregate_text(results: &[ToolInvocationResult]) -> String {
    results
        .iter()
        .map(|result| {
            let body = match result.status {
                InvocationStatus::Success => render_text(&result.output),
                InvocationStatus::Error => result
                    .output
                    .get("error")
                    .and_then(Value::as_str)
                    .map(|e| format!("Error: {}", e))
                    .unwrap_or_else(|| render_text(&result.output)),
            };
            let label = match result.status {
                InvocationStatus::Success => "success",
                InvocationStatus::Error => "error",
            };
            format!("## {} ({})\n{}", result.tool_name, label, body)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
