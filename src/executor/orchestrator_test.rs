// ABOUTME: Tests for the Executor - ordering, silent skips, per-tool failure
// ABOUTME: isolation, run-level failures, and bounded concurrency.

use super::*;
use crate::catalog::{Catalog, GENERIC_API_CAPABILITY, Tool};
use crate::error::TransportError;
use crate::inference::ArgumentSource;
use crate::transport::{InvocationArguments, Protocol, TransportClient, TransportRegistry};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Box<dyn Fn(&str) -> Result<String, TransportError> + Send + Sync>;

/// Transport that answers from a closure and records every call.
struct MockTransport {
    protocol: Protocol,
    responder: Responder,
    delays: HashMap<String, u64>,
    calls: Mutex<Vec<(String, InvocationArguments)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    fn new(
        protocol: Protocol,
        responder: impl Fn(&str) -> Result<String, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            protocol,
            responder: Box::new(responder),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn ok(body: &'static str) -> Self {
        Self::new(Protocol::JsonRpc, move |_| Ok(body.to_string()))
    }

    fn delay(mut self, tool: &str, ms: u64) -> Self {
        self.delays.insert(tool.to_string(), ms);
        self
    }

    fn calls(&self) -> Vec<(String, InvocationArguments)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransportClient for MockTransport {
    fn protocol(&self) -> Protocol {
        self.protocol
    }

    fn base_url(&self) -> &str {
        "http://mock"
    }

    async fn invoke(
        &self,
        tool_name: &str,
        arguments: &InvocationArguments,
    ) -> Result<String, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((tool_name.to_string(), arguments.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(ms) = self.delays.get(tool_name) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        (self.responder)(tool_name)
    }
}

async fn catalog_with(tools: &[(&str, &str)]) -> Catalog {
    let catalog = Catalog::new();
    for (name, category) in tools {
        catalog.register(Tool::new(*name, *category)).await.unwrap();
    }
    catalog
}

fn names(report: &ExecutionReport) -> Vec<&str> {
    report
        .tool_results
        .iter()
        .map(|r| r.tool_name.as_str())
        .collect()
}

#[tokio::test]
async fn test_results_follow_request_order_and_skip_unknown() {
    let catalog = catalog_with(&[("toolA", "jira"), ("toolC", "jira")]).await;
    let transport = Arc::new(MockTransport::ok(r#"{"result": {"ok": true}}"#));
    let executor = Executor::new(
        catalog,
        TransportRegistry::new().with("jira", transport.clone()),
    );

    let report = executor
        .execute(&TaskRequest::new("do things").tools(["toolA", "toolB", "toolC"]))
        .await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(names(&report), vec!["toolA", "toolC"]);
    assert_eq!(report.skipped_tools, vec!["toolB"]);
    assert!(report.result("toolB").is_none());
    assert_eq!(report.tool_results[0].output, json!({"ok": true}));
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn test_unconfigured_category_is_error_result() {
    let catalog = catalog_with(&[("wiki_search", "confluence"), ("toolA", "jira")]).await;
    let executor = Executor::new(
        catalog,
        TransportRegistry::new().with("jira", Arc::new(MockTransport::ok(r#"{"result": 1}"#))),
    );

    let report = executor
        .execute(&TaskRequest::new("search the wiki").tools(["wiki_search", "toolA"]))
        .await;

    assert!(report.is_completed());
    let wiki = report.result("wiki_search").unwrap();
    assert_eq!(wiki.status, InvocationStatus::Error);
    assert_eq!(wiki.output["category"], "confluence");
    assert!(wiki.output["error"].as_str().unwrap().contains("confluence"));
    assert!(report.result("toolA").unwrap().is_success());
}

#[tokio::test]
async fn test_transport_failure_does_not_abort_run() {
    let catalog = catalog_with(&[("broken", "jira"), ("fine", "jira")]).await;
    let transport = MockTransport::new(Protocol::JsonRpc, |tool| {
        if tool == "broken" {
            Err(TransportError::Status {
                status: 502,
                body: "bad gateway".into(),
            })
        } else {
            Ok(r#"{"result": "done"}"#.into())
        }
    });
    let executor = Executor::new(
        catalog,
        TransportRegistry::new().with("jira", Arc::new(transport)),
    );

    let report = executor
        .execute(&TaskRequest::new("go").tools(["broken", "fine"]))
        .await;

    assert!(report.is_completed());
    assert_eq!(report.error_count(), 1);
    let broken = report.result("broken").unwrap();
    assert_eq!(broken.output["status"], 502);
    assert_eq!(broken.output["body"], "bad gateway");
    assert_eq!(report.result("fine").unwrap().output, json!("done"));
}

#[tokio::test]
async fn test_remote_error_and_empty_reply() {
    let catalog = catalog_with(&[("rpc_fail", "jira"), ("silent", "jira")]).await;
    let transport = MockTransport::new(Protocol::JsonRpc, |tool| {
        Ok(match tool {
            "rpc_fail" => "event: message\ndata: {\"error\":{\"code\":-32602,\"message\":\"Invalid params\"}}\n\n".to_string(),
            _ => String::new(),
        })
    });
    let executor = Executor::new(
        catalog,
        TransportRegistry::new().with("jira", Arc::new(transport)),
    );

    let report = executor
        .execute(&TaskRequest::new("go").tools(["rpc_fail", "silent"]))
        .await;

    let failed = report.result("rpc_fail").unwrap();
    assert_eq!(failed.status, InvocationStatus::Error);
    assert_eq!(failed.output["error"], "Invalid params");
    assert_eq!(failed.output["code"], -32602);

    let silent = report.result("silent").unwrap();
    assert_eq!(silent.status, InvocationStatus::Success);
    assert_eq!(silent.output["empty_response"], true);
}

#[tokio::test]
async fn test_explicit_inputs_and_remote_name_reach_transport() {
    let catalog = Catalog::new();
    catalog
        .register(Tool::new("issue", "jira").with_remote_name("jira_get_issue"))
        .await
        .unwrap();
    let transport = Arc::new(MockTransport::ok(r#"{"result": {}}"#));
    let executor = Executor::new(
        catalog,
        TransportRegistry::new().with("jira", transport.clone()),
    );

    let report = executor
        .execute(
            &TaskRequest::new("fetch ABC-123")
                .tool("issue")
                .input("endpoint", "custom"),
        )
        .await;

    let calls = transport.calls();
    assert_eq!(calls[0].0, "jira_get_issue");
    assert_eq!(calls[0].1, json!({"endpoint": "custom"}).as_object().cloned().unwrap());
    assert_eq!(report.tool_results[0].argument_source, ArgumentSource::Explicit);
}

#[tokio::test]
async fn test_heuristic_arguments_for_generic_tool() {
    let catalog = Catalog::new();
    catalog
        .register(Tool::new("jira_api", "jira").capability(GENERIC_API_CAPABILITY))
        .await
        .unwrap();
    let transport = Arc::new(MockTransport::ok(r#"{"result": {"key": "PROJ-5"}}"#));
    let executor = Executor::new(
        catalog,
        TransportRegistry::new().with("jira", transport.clone()),
    );

    let report = executor
        .execute_task(
            &["jira_api".to_string()],
            "get details for PROJ-5",
            &InvocationArguments::new(),
        )
        .await;

    let result = &report.tool_results[0];
    assert!(result.is_success());
    assert_eq!(result.argument_source, ArgumentSource::Heuristic);
    assert_eq!(result.arguments["endpoint"], "/rest/api/2/issue/PROJ-5");
    assert_eq!(transport.calls()[0].1["method"], "GET");
}

#[tokio::test]
async fn test_blank_task_fails_the_run() {
    let executor = Executor::new(Catalog::new(), TransportRegistry::new());

    let report = executor.execute(&TaskRequest::new("   ").tool("toolA")).await;

    assert_eq!(report.status, RunStatus::Failed);
    assert!(report.error.as_deref().unwrap().contains("neither a query"));
    assert!(report.tool_results.is_empty());
}

#[tokio::test]
async fn test_empty_agent_name_fails_the_run() {
    let executor = Executor::new(Catalog::new(), TransportRegistry::new());

    let report = executor
        .execute(&TaskRequest::new("hello").agent_name(" "))
        .await;

    assert_eq!(report.status, RunStatus::Failed);
    assert!(report.error.is_some());
}

#[tokio::test]
async fn test_agent_name_defaults_and_override() {
    let executor =
        Executor::new(Catalog::new(), TransportRegistry::new()).with_agent_name("triage-bot");

    let report = executor.execute(&TaskRequest::new("hello")).await;
    assert_eq!(report.agent_name, "triage-bot");
    assert!(report.is_completed());
    assert!(report.tool_results.is_empty());

    let report = executor
        .execute(&TaskRequest::new("hello").agent_name("other"))
        .await;
    assert_eq!(report.agent_name, "other");
}

#[tokio::test]
async fn test_sequential_by_default() {
    let catalog = catalog_with(&[("a", "jira"), ("b", "jira"), ("c", "jira")]).await;
    let transport = Arc::new(
        MockTransport::ok(r#"{"result": 1}"#)
            .delay("a", 20)
            .delay("b", 20)
            .delay("c", 20),
    );
    let executor = Executor::new(
        catalog,
        TransportRegistry::new().with("jira", transport.clone()),
    );

    executor
        .execute(&TaskRequest::new("go").tools(["a", "b", "c"]))
        .await;

    assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_run_keeps_order() {
    let catalog = catalog_with(&[("slow", "jira"), ("medium", "jira"), ("fast", "jira")]).await;
    let transport = Arc::new(
        MockTransport::new(Protocol::Rest, |tool| Ok(format!("{{\"tool\": \"{}\"}}", tool)))
            .delay("slow", 120)
            .delay("medium", 60)
            .delay("fast", 5),
    );
    let executor = Executor::new(
        catalog,
        TransportRegistry::new().with("jira", transport.clone()),
    )
    .with_max_concurrency(3);

    let report = executor
        .execute(&TaskRequest::new("go").tools(["slow", "medium", "fast"]))
        .await;

    assert_eq!(names(&report), vec!["slow", "medium", "fast"]);
    assert_eq!(report.tool_results[0].output, json!({"tool": "slow"}));
    assert!(transport.max_in_flight.load(Ordering::SeqCst) > 1);
}

#[tokio::test]
async fn test_aggregated_text_has_a_section_per_result() {
    let catalog = catalog_with(&[("ok", "jira"), ("missing_transport", "github")]).await;
    let transport = MockTransport::ok(
        r#"{"result": {"content": [{"type": "text", "text": "Issue PROJ-5: Login broken"}]}}"#,
    );
    let executor = Executor::new(
        catalog,
        TransportRegistry::new().with("jira", Arc::new(transport)),
    );

    let report = executor
        .execute(&TaskRequest::new("go").tools(["ok", "missing_transport"]))
        .await;

    assert!(report.aggregated_text.contains("## ok (success)\nIssue PROJ-5: Login broken"));
    assert!(report
        .aggregated_text
        .contains("## missing_transport (error)\nError: No transport configured for category 'github'"));
}

#[test]
fn test_report_serializes_camel_case() {
    let report = ExecutionReport::failed(uuid::Uuid::nil(), "bot", "boom");
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["agentName"], "bot");
    assert_eq!(value["status"], "failed");
    assert_eq!(value["toolResults"], json!([]));
    assert_eq!(value["error"], "boom");
}
