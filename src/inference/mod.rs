// ABOUTME: Argument inference - turns a free-text query into the argument
// ABOUTME: map for a tool call, through explicit, generated and heuristic tiers.

mod generator;
pub mod heuristics;
mod pipeline;
mod reference;

pub use generator::{ArgumentGenerator, GenerationRequest, LlmArgumentGenerator, parse_arguments};
pub use heuristics::extract_issue_key;
pub use pipeline::{ArgumentPipeline, ArgumentSource, ResolvedArguments};
pub use reference::call_shape_reference;
