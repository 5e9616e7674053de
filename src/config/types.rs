// ABOUTME: Configuration types - catalog, static tools, per-category
// ABOUTME: transports, inference and executor settings.

//! Configuration types for `toolrun.toml`
//!
//! Example configuration:
//!
//! ```toml
//! [catalog]
//! store_path = "~/.local/share/toolrun/tools.json"
//!
//! [[tools]]
//! name = "jira_call_api"
//! category = "jira"
//! description = "Call any Jira REST endpoint"
//! capabilities = ["rest_api"]
//!
//! [transports.jira]
//! protocol = "json_rpc"
//! base_url = "https://mcp.example.com/jira"
//! auth = { kind = "bearer", token_env = "JIRA_TOKEN" }
//!
//! [transports.webex]
//! protocol = "rest"
//! base_url = "https://webex-tools.example.com"
//! auth = { kind = "header", header = "X-Webex-Token", token_env = "WEBEX_TOKEN" }
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::Tool;
use crate::error::ConfigError;
use crate::transport::{AuthScheme, Protocol, TimeoutProfile};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolrunConfig {
    pub catalog: CatalogConfig,
    /// Tools registered at startup, before any stored tools are loaded.
    pub tools: Vec<Tool>,
    /// Transport client per category.
    pub transports: BTreeMap<String, TransportConfig>,
    pub inference: InferenceConfig,
    pub executor: ExecutorConfig,
}

impl ToolrunConfig {
    /// Check cross-field constraints figment cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.executor.max_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "executor.max_concurrency must be at least 1".into(),
            ));
        }
        for (category, transport) in &self.transports {
            if transport.base_url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "transports.{}.base_url is empty",
                    category
                )));
            }
        }
        for tool in &self.tools {
            tool.validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }
}

/// `[catalog]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON file backing the catalog. No persistence when unset.
    pub store_path: Option<PathBuf>,
}

/// `[transports.<category>]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub protocol: Protocol,
    pub base_url: String,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

impl TransportConfig {
    pub fn timeouts(&self) -> TimeoutProfile {
        TimeoutProfile {
            connect: Duration::from_secs(self.connect_timeout_secs),
            request: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// Authentication kinds accepted in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    #[default]
    None,
    Bearer,
    Header,
}

/// Authentication settings for one transport.
///
/// The token is taken from `token` or, when that is unset, from the
/// environment variable named by `token_env`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub kind: AuthKind,
    /// Header name for `kind = "header"`.
    pub header: Option<String>,
    pub token: Option<String>,
    pub token_env: Option<String>,
}

impl AuthConfig {
    /// Resolve to a concrete scheme, reading the token from the environment if needed.
    pub fn resolve(&self) -> Result<AuthScheme, ConfigError> {
        if self.kind == AuthKind::None {
            return Ok(AuthScheme::None);
        }

        let token = match (&self.token, &self.token_env) {
            (Some(token), _) => token.clone(),
            (None, Some(var)) => std::env::var(var).map_err(|_| {
                ConfigError::Invalid(format!("environment variable {} is not set", var))
            })?,
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "auth requires either token or token_env".into(),
                ));
            }
        };

        match self.kind {
            AuthKind::Bearer => Ok(AuthScheme::Bearer(token)),
            AuthKind::Header => {
                let name = self.header.clone().ok_or_else(|| {
                    ConfigError::Invalid("auth kind 'header' requires a header name".into())
                })?;
                Ok(AuthScheme::Header { name, value: token })
            }
            AuthKind::None => Ok(AuthScheme::None),
        }
    }
}

/// Provider behind the generated-arguments tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// Generated tier disabled; heuristics follow explicit inputs directly.
    #[default]
    None,
    /// OpenAI chat completions, key from `OPENAI_API_KEY`.
    OpenAi,
    /// A local Ollama server.
    Ollama,
}

/// `[inference]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub generator: GeneratorKind,
    pub model: String,
    /// Override for the provider endpoint.
    pub base_url: Option<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorKind::None,
            model: "gpt-4o-mini".to_string(),
            base_url: None,
        }
    }
}

/// `[executor]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Tools invoked at once within one run. 1 means strictly sequential.
    pub max_concurrency: usize,
    /// Name reported for runs that do not supply one.
    pub agent_name: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            agent_name: "toolrun".to_string(),
        }
    }
}
