// ABOUTME: Root module for toolrun - remote tool execution library.
// ABOUTME: Re-exports all public types from submodules.

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod inference;
pub mod llm;
pub mod prelude;
pub mod response;
pub mod transport;

pub use error::ToolrunError;
