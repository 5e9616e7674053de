// ABOUTME: Catalog module - tool definitions, the shared catalog, and its
// ABOUTME: persistence port.

mod catalog;
mod store;
mod tool;

pub use catalog::Catalog;
pub use store::{CatalogStore, JsonFileStore, MemoryStore};
pub use tool::{GENERIC_API_CAPABILITY, Tool};

#[cfg(test)]
mod catalog_test;
