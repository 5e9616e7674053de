// ABOUTME: Catalog persistence port and its implementations: a JSON file
// ABOUTME: store for real deployments and an in-memory store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::Tool;
use crate::error::CatalogError;

/// Backing store for catalog contents.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Load every stored tool.
    async fn load_all(&self) -> Result<Vec<Tool>, CatalogError>;

    /// Replace the stored contents with `tools`.
    async fn save_all(&self, tools: &[Tool]) -> Result<(), CatalogError>;
}

/// Stores the catalog as a pretty-printed JSON array in a single file.
///
/// Saves through one store are serialized, since they share a temp file.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogStore for JsonFileStore {
    async fn load_all(&self) -> Result<Vec<Tool>, CatalogError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn save_all(&self, tools: &[Tool]) -> Result<(), CatalogError> {
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write then rename so readers never see a half-written file
        let json = serde_json::to_string_pretty(tools)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Keeps the stored catalog in memory.
#[derive(Default)]
pub struct MemoryStore {
    tools: Mutex<Vec<Tool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with tools.
    pub fn with_tools(tools: Vec<Tool>) -> Self {
        Self {
            tools: Mutex::new(tools),
        }
    }

    /// Current stored contents.
    pub async fn snapshot(&self) -> Vec<Tool> {
        self.tools.lock().await.clone()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn load_all(&self) -> Result<Vec<Tool>, CatalogError> {
        Ok(self.tools.lock().await.clone())
    }

    async fn save_all(&self, tools: &[Tool]) -> Result<(), CatalogError> {
        *self.tools.lock().await = tools.to_vec();
        Ok(())
    }
}
