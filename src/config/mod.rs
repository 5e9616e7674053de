// ABOUTME: Config module - typed settings and the figment-based loader.
// ABOUTME: Re-exports the loader and every settings type.

//! Configuration loading for toolrun
//!
//! Settings are merged from built-in defaults, the global and project
//! `toolrun.toml` files, an explicit path, and `TOOLRUN_` environment
//! variables.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AuthConfig, AuthKind, CatalogConfig, ExecutorConfig, GeneratorKind, InferenceConfig,
    ToolrunConfig, TransportConfig,
};
