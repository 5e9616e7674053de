// ABOUTME: Executor module - runs a task's allowed tools and reports the
// ABOUTME: per-tool outcomes in request order.

mod orchestrator;
mod report;

pub use orchestrator::Executor;
pub use report::{
    ExecutionReport, InvocationStatus, RunStatus, TaskRequest, ToolInvocationResult,
};

#[cfg(test)]
mod orchestrator_test;
