// ABOUTME: Defines the Tool type - a named remote capability belonging to a
// ABOUTME: category, with description, capability tags, and advisory inputs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Capability tag for tools that accept a generic REST call shape
/// (`endpoint`, `method`, `body`, `params`) instead of typed arguments.
pub const GENERIC_API_CAPABILITY: &str = "rest_api";

/// A remote-invocable tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    /// Unique catalog key.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Remote system this tool belongs to; selects the transport client.
    pub category: String,

    #[serde(default)]
    pub capabilities: BTreeSet<String>,

    /// Inputs the tool expects. Informative only, never enforced at call time.
    #[serde(default)]
    pub required_inputs: Vec<String>,

    /// Name the remote server knows this tool by, when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_name: Option<String>,
}

impl Tool {
    /// Create a tool with the given name and category.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: category.into(),
            capabilities: BTreeSet::new(),
            required_inputs: Vec::new(),
            remote_name: None,
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a capability tag.
    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    /// Append a required input field.
    pub fn required_input(mut self, input: impl Into<String>) -> Self {
        self.required_inputs.push(input.into());
        self
    }

    /// Set the remote tool name.
    pub fn with_remote_name(mut self, remote_name: impl Into<String>) -> Self {
        self.remote_name = Some(remote_name.into());
        self
    }

    /// The name to send to the remote server.
    pub fn remote_name(&self) -> &str {
        self.remote_name.as_deref().unwrap_or(&self.name)
    }

    /// Check whether the tool carries a capability tag.
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    /// Whether the tool takes the generic REST call shape.
    pub fn is_generic_api(&self) -> bool {
        self.has_capability(GENERIC_API_CAPABILITY)
    }

    /// Reject definitions the catalog cannot key or route.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::Invalid("tool name is empty".into()));
        }
        if self.category.trim().is_empty() {
            return Err(CatalogError::Invalid(format!(
                "tool '{}' has no category",
                self.name
            )));
        }
        Ok(())
    }
}
