//! The text-generation port.
//!
//! The diagram service asks a language model for a graph description through
//! this trait. The `llm` crate supplies the HTTP implementation; tests supply
//! scripted ones.

use async_trait::async_trait;

use crate::GenerationError;

/// Produces free text for a prompt.
///
/// Implementations make exactly one upstream call per invocation and do not
/// retry. An empty or whitespace-only answer is reported as
/// [`GenerationError::Empty`], never as `Ok("")`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends `prompt` to the model and returns its raw answer.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
