// ABOUTME: Maps categories to their transport clients. An unknown category
// ABOUTME: yields None so callers can report it instead of failing.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::{JsonRpcClient, Protocol, RestClient, TransportClient};
use crate::config::TransportConfig;
use crate::error::ConfigError;

/// Category to transport client lookup.
#[derive(Default, Clone)]
pub struct TransportRegistry {
    clients: HashMap<String, Arc<dyn TransportClient>>,
}

impl TransportRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one client per configured category.
    pub fn from_config(
        transports: &BTreeMap<String, TransportConfig>,
    ) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for (category, config) in transports {
            let auth = config.auth.resolve().map_err(|e| {
                ConfigError::Invalid(format!("transports.{}: {}", category, e))
            })?;
            let invalid = |e: crate::error::TransportError| {
                ConfigError::Invalid(format!("transports.{}: {}", category, e))
            };

            let client: Arc<dyn TransportClient> = match config.protocol {
                Protocol::JsonRpc => Arc::new(
                    JsonRpcClient::new(&config.base_url, auth, config.timeouts()).map_err(invalid)?,
                ),
                Protocol::Rest => Arc::new(
                    RestClient::new(&config.base_url, auth, config.timeouts()).map_err(invalid)?,
                ),
            };
            registry.register(category.clone(), client);
        }
        Ok(registry)
    }

    /// Bind a client to a category, replacing any previous binding.
    pub fn register(&mut self, category: impl Into<String>, client: Arc<dyn TransportClient>) {
        self.clients.insert(category.into(), client);
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with(mut self, category: impl Into<String>, client: Arc<dyn TransportClient>) -> Self {
        self.register(category, client);
        self
    }

    /// The client for a category, if one is configured.
    pub fn client_for(&self, category: &str) -> Option<Arc<dyn TransportClient>> {
        self.clients.get(category).cloned()
    }

    /// Configured categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<_> = self.clients.keys().cloned().collect();
        categories.sort();
        categories
    }
}
