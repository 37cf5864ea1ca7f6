//! Provider traits for embeddings and chat completion.

use async_trait::async_trait;

use crate::error::LlmError;

/// Turns text into dense vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Embed each text; the result has one vector per input, in order.
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>, LlmError>;
}

/// Produces a single text completion.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Complete `prompt` under the system `preamble`.
    async fn complete(&self, preamble: &str, prompt: &str) -> Result<String, LlmError>;
}
