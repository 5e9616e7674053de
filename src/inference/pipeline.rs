// ABOUTME: The three-tier argument pipeline: explicit inputs, then the
// ABOUTME: optional generator, then deterministic category heuristics.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::heuristics;
use super::{ArgumentGenerator, GenerationRequest, call_shape_reference};
use crate::catalog::Tool;
use crate::transport::InvocationArguments;

/// Which tier produced a tool call's arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentSource {
    Explicit,
    Generated,
    Heuristic,
}

impl fmt::Display for ArgumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentSource::Explicit => write!(f, "explicit"),
            ArgumentSource::Generated => write!(f, "generated"),
            ArgumentSource::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Arguments together with the tier that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArguments {
    pub arguments: InvocationArguments,
    pub source: ArgumentSource,
}

/// Resolves the arguments for a tool call.
///
/// Tiers run in strict order and the first to produce a non-empty map wins.
/// Explicit inputs are returned verbatim. A generator that is absent, fails,
/// or returns nothing falls through to the heuristics, which always answer.
#[derive(Clone, Default)]
pub struct ArgumentPipeline {
    generator: Option<Arc<dyn ArgumentGenerator>>,
}

impl ArgumentPipeline {
    /// A pipeline with only the explicit and heuristic tiers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the generated tier.
    pub fn with_generator(mut self, generator: Arc<dyn ArgumentGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Build the arguments for one call of `tool`.
    pub async fn build_arguments(
        &self,
        tool: &Tool,
        query: &str,
        explicit: &InvocationArguments,
    ) -> ResolvedArguments {
        if !explicit.is_empty() {
            tracing::debug!(tool = %tool.name, "Using explicit arguments");
            return ResolvedArguments {
                arguments: explicit.clone(),
                source: ArgumentSource::Explicit,
            };
        }

        if let Some(arguments) = self.generate(tool, query).await {
            tracing::debug!(tool = %tool.name, "Using generated arguments");
            return ResolvedArguments {
                arguments,
                source: ArgumentSource::Generated,
            };
        }

        let arguments = heuristics::infer(tool, query);
        tracing::debug!(tool = %tool.name, keys = arguments.len(), "Using heuristic arguments");
        ResolvedArguments {
            arguments,
            source: ArgumentSource::Heuristic,
        }
    }

    async fn generate(&self, tool: &Tool, query: &str) -> Option<InvocationArguments> {
        let generator = self.generator.as_ref()?;
        if query.trim().is_empty() {
            return None;
        }

        let request = GenerationRequest {
            tool_name: &tool.name,
            description: &tool.description,
            category: &tool.category,
            query,
            reference: call_shape_reference(&tool.category),
        };
        match generator.generate_arguments(request).await {
            Ok(Some(arguments)) if !arguments.is_empty() => Some(arguments),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(tool = %tool.name, error = %e, "Argument generation failed; falling back to heuristics");
                None
            }
        }
    }
}
