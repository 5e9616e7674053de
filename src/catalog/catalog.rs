// ABOUTME: Implements the Catalog - a thread-safe index of every invocable
// ABOUTME: tool, with best-effort write-behind persistence to a backing store.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};

use super::{CatalogStore, Tool};
use crate::error::CatalogError;

/// A thread-safe catalog of tools.
///
/// Clones share state. Mutations are serialized by a write lock and, when a
/// store is attached, push a snapshot onto a write-behind queue. Persistence
/// failures are logged and never reach the caller.
#[derive(Default)]
pub struct Catalog {
    tools: Arc<RwLock<HashMap<String, Tool>>>,
    persistence: Option<WriteBehind>,
}

#[derive(Clone)]
struct WriteBehind {
    store: Arc<dyn CatalogStore>,
    tx: mpsc::UnboundedSender<Vec<Tool>>,
}

impl Catalog {
    /// Create a new empty catalog with no backing store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty catalog that persists to `store`.
    ///
    /// Spawns the write-behind task, so this must run inside a Tokio runtime.
    pub fn with_store(store: Arc<dyn CatalogStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<Tool>>();
        let writer = store.clone();

        tokio::spawn(async move {
            while let Some(mut snapshot) = rx.recv().await {
                // Only the newest snapshot matters
                while let Ok(newer) = rx.try_recv() {
                    snapshot = newer;
                }
                if let Err(e) = writer.save_all(&snapshot).await {
                    tracing::warn!(error = %e, tools = snapshot.len(), "Failed to persist tool catalog");
                }
            }
        });

        Self {
            tools: Arc::new(RwLock::new(HashMap::new())),
            persistence: Some(WriteBehind { store, tx }),
        }
    }

    /// Load every tool from the backing store, overwriting entries with the same name.
    ///
    /// Returns the number of tools loaded; zero when no store is attached.
    pub async fn load_from_store(&self) -> Result<usize, CatalogError> {
        let Some(persistence) = &self.persistence else {
            return Ok(0);
        };

        let loaded = persistence.store.load_all().await?;
        let mut count = 0;
        let mut tools = self.tools.write().await;
        for tool in loaded {
            if let Err(e) = tool.validate() {
                tracing::warn!(error = %e, "Skipping invalid stored tool");
                continue;
            }
            tools.insert(tool.name.clone(), tool);
            count += 1;
        }
        tracing::debug!(count, "Loaded tools from store");
        Ok(count)
    }

    /// Register a tool, overwriting any tool with the same name.
    pub async fn register(&self, tool: Tool) -> Result<(), CatalogError> {
        tool.validate()?;
        let mut tools = self.tools.write().await;
        tools.insert(tool.name.clone(), tool);
        self.persist(&tools);
        Ok(())
    }

    /// Register several tools under a single write lock.
    pub async fn register_all(
        &self,
        new_tools: impl IntoIterator<Item = Tool>,
    ) -> Result<usize, CatalogError> {
        let new_tools: Vec<Tool> = new_tools.into_iter().collect();
        for tool in &new_tools {
            tool.validate()?;
        }

        let count = new_tools.len();
        let mut tools = self.tools.write().await;
        for tool in new_tools {
            tools.insert(tool.name.clone(), tool);
        }
        self.persist(&tools);
        Ok(count)
    }

    /// Get a tool by name.
    pub async fn lookup(&self, name: &str) -> Option<Tool> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// Check whether a tool is registered.
    pub async fn exists(&self, name: &str) -> bool {
        self.tools.read().await.contains_key(name)
    }

    /// Remove a tool. Returns whether it was present.
    pub async fn remove(&self, name: &str) -> bool {
        let mut tools = self.tools.write().await;
        let removed = tools.remove(name).is_some();
        if removed {
            self.persist(&tools);
        }
        removed
    }

    /// Replace the tool stored under `name`.
    ///
    /// When `tool.name` differs from `name`, the old key is dropped and the
    /// new key inserted in the same critical section.
    pub async fn update(&self, name: &str, tool: Tool) -> Result<(), CatalogError> {
        tool.validate()?;
        let mut tools = self.tools.write().await;
        if tools.remove(name).is_none() {
            return Err(CatalogError::NotFound(name.to_string()));
        }
        tools.insert(tool.name.clone(), tool);
        self.persist(&tools);
        Ok(())
    }

    /// All tools, sorted by name.
    pub async fn list_all(&self) -> Vec<Tool> {
        let tools = self.tools.read().await;
        sorted(tools.values().cloned().collect())
    }

    /// Tools in one category, sorted by name.
    pub async fn list_by_category(&self, category: &str) -> Vec<Tool> {
        let tools = self.tools.read().await;
        sorted(
            tools
                .values()
                .filter(|t| t.category == category)
                .cloned()
                .collect(),
        )
    }

    /// Distinct categories, sorted.
    pub async fn categories(&self) -> Vec<String> {
        let tools = self.tools.read().await;
        tools
            .values()
            .map(|t| t.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of registered tools.
    pub async fn count(&self) -> usize {
        self.tools.read().await.len()
    }

    /// Save the current contents to the backing store and wait for it.
    ///
    /// Unlike mutation-triggered writes, this reports the store's error.
    pub async fn persist_now(&self) -> Result<(), CatalogError> {
        let Some(persistence) = &self.persistence else {
            return Ok(());
        };
        let snapshot = self.list_all().await;
        persistence.store.save_all(&snapshot).await
    }

    /// Queue a snapshot for the write-behind task.
    ///
    /// Called with the write guard held so snapshots enter the queue in
    /// mutation order.
    fn persist(&self, tools: &HashMap<String, Tool>) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let snapshot = sorted(tools.values().cloned().collect());
        if persistence.tx.send(snapshot).is_err() {
            tracing::warn!("Catalog write-behind queue is closed; change not persisted");
        }
    }
}

impl Clone for Catalog {
    fn clone(&self) -> Self {
        Self {
            tools: Arc::clone(&self.tools),
            persistence: self.persistence.clone(),
        }
    }
}

fn sorted(mut tools: Vec<Tool>) -> Vec<Tool> {
    tools.sort_by(|a, b| a.name.cmp(&b.name));
    tools
}
