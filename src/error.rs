//! Error types for FAQ Assist.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors (embeddings and chat completion).
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Anything that goes wrong between "question received" and "answer text".
///
/// Every variant maps to the same generic 500 at the HTTP boundary; the
/// detail is for operators only.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Failed to load corpus {path}: {source}")]
    CorpusLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corpus {path} produced no fragments")]
    EmptyCorpus { path: String },

    #[error("Embedding failed: {0}")]
    Embedding(#[source] LlmError),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Answer generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("Retrieval binding initialization failed: {0}")]
    Initialization(String),
}
