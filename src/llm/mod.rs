// ABOUTME: LLM module - client abstraction for language model providers.
// ABOUTME: Backs the generated tier of argument inference.

mod client;
mod ollama;
mod openai;
mod types;

pub use client::*;
pub use ollama::*;
pub use openai::*;
pub use types::*;
