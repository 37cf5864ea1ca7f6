//! LLM integration for FAQ Assist.
//!
//! Uses the rig-core crate for HTTP transport to OpenAI. `RigEmbedder` and
//! `RigChatModel` bridge rig's model traits to our `Embedder` and
//! `ChatModel` traits, so the retrieval code never touches rig directly.

pub mod provider;
mod rig_adapter;

pub use provider::{ChatModel, Embedder};
pub use rig_adapter::{RigChatModel, RigEmbedder};

use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::error::LlmError;

/// Configuration for creating the LLM providers.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: secrecy::SecretString,
    pub chat_model: String,
    pub embedding_model: String,
    /// Sampling temperature for answers. Grounded Q&A wants 0.
    pub temperature: f64,
}

/// The embedder and chat model the retrieval pipeline runs on.
#[derive(Clone)]
pub struct Providers {
    pub embedder: Arc<dyn Embedder>,
    pub chat: Arc<dyn ChatModel>,
}

/// Create both providers from configuration.
pub fn create_providers(config: &LlmConfig) -> Result<Providers, LlmError> {
    let client = rig_adapter::openai_client(config.api_key.expose_secret())?;

    let embedder = rig_adapter::openai_embedder(&client, &config.embedding_model);
    let chat = RigChatModel::new(client, &config.chat_model, config.temperature);

    tracing::info!(
        "Using OpenAI (chat: {}, embeddings: {})",
        config.chat_model,
        config.embedding_model
    );

    Ok(Providers {
        embedder: Arc::new(embedder),
        chat: Arc::new(chat),
    })
}
