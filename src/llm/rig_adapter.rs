//! rig-core backed implementations of `Embedder` and `ChatModel`.

use async_trait::async_trait;
use rig::client::{CompletionClient, EmbeddingsClient};
use rig::completion::Prompt;
use rig::embeddings::EmbeddingModel;
use rig::providers::openai;

use super::provider::{ChatModel, Embedder};
use crate::error::LlmError;

type OpenAiClient = rig::client::Client<openai::client::OpenAIResponsesExt>;

/// Bridges a rig `EmbeddingModel` to our `Embedder` trait.
pub struct RigEmbedder<M> {
    model: M,
    model_name: String,
    provider: &'static str,
}

impl<M> RigEmbedder<M> {
    pub fn new(model: M, model_name: &str, provider: &'static str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider,
        }
    }
}

#[async_trait]
impl<M> Embedder for RigEmbedder<M>
where
    M: EmbeddingModel + Send + Sync,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>, LlmError> {
        let expected = texts.len();
        let embeddings = self
            .model
            .embed_texts(texts)
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: self.provider.to_string(),
                reason: e.to_string(),
            })?;

        if embeddings.len() != expected {
            return Err(LlmError::InvalidResponse {
                provider: self.provider.to_string(),
                reason: format!("expected {expected} embeddings, got {}", embeddings.len()),
            });
        }

        Ok(embeddings.into_iter().map(|e| e.vec).collect())
    }
}

/// Chat completion through an OpenAI rig client, one agent per call.
pub struct RigChatModel {
    client: OpenAiClient,
    model_name: String,
    temperature: f64,
}

impl RigChatModel {
    pub fn new(client: OpenAiClient, model_name: &str, temperature: f64) -> Self {
        Self {
            client,
            model_name: model_name.to_string(),
            temperature,
        }
    }
}

#[async_trait]
impl ChatModel for RigChatModel {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, preamble: &str, prompt: &str) -> Result<String, LlmError> {
        let agent = self
            .client
            .agent(self.model_name.as_str())
            .preamble(preamble)
            .temperature(self.temperature)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: "openai".to_string(),
                reason: e.to_string(),
            })
    }
}

/// Build the OpenAI rig client.
pub(crate) fn openai_client(api_key: &str) -> Result<OpenAiClient, LlmError> {
    openai::Client::new(api_key).map_err(|e| LlmError::RequestFailed {
        provider: "openai".to_string(),
        reason: format!("Failed to create OpenAI client: {}", e),
    })
}

/// Embedding model handle for `model_name` on `client`.
pub(crate) fn openai_embedder(
    client: &OpenAiClient,
    model_name: &str,
) -> RigEmbedder<impl EmbeddingModel + Send + Sync + 'static> {
    RigEmbedder::new(client.embedding_model(model_name), model_name, "openai")
}
