// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use toolrun::prelude::*;` to get started quickly.

pub use crate::catalog::{
    Catalog, CatalogStore, GENERIC_API_CAPABILITY, JsonFileStore, MemoryStore, Tool,
};
pub use crate::config::{ConfigLoader, ToolrunConfig};
pub use crate::error::{CatalogError, ConfigError, LlmError, ToolrunError, TransportError};
pub use crate::executor::{
    ExecutionReport, Executor, InvocationStatus, RunStatus, TaskRequest, ToolInvocationResult,
};
pub use crate::inference::{
    ArgumentGenerator, ArgumentPipeline, ArgumentSource, GenerationRequest, LlmArgumentGenerator,
};
pub use crate::llm::{LlmClient, OllamaClient, OpenAIClient};
pub use crate::response::{NormalizedResponse, normalize, render_text};
pub use crate::transport::{
    AuthScheme, InvocationArguments, JsonRpcClient, Protocol, RestClient, TimeoutProfile,
    TransportClient, TransportRegistry,
};
