//! Configuration types.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Header carrying the shared secret on every Q&A request.
pub const SECRET_HEADER: &str = "x-chatbot-secret";

/// Session id used when the client does not send one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Retrieval tuning knobs.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Path of the single text document the answers are grounded in.
    pub corpus_path: PathBuf,
    /// Maximum characters per fragment.
    pub chunk_size: usize,
    /// Characters shared between neighbouring fragments.
    pub chunk_overlap: usize,
    /// Number of fragments handed to the model per question.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("./data/faq.txt"),
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 4,
        }
    }
}

/// Session store tuning knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sessions untouched for this long are evicted.
    pub idle_timeout: Duration,
    /// How often the eviction sweep runs.
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(3600), // 1 hour
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Service configuration, assembled from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server listens on.
    pub bind: SocketAddr,
    /// Shared secret expected in `x-chatbot-secret`. `None` rejects everything.
    pub secret: Option<SecretString>,
    /// OpenAI API key for embeddings and chat completion.
    pub openai_api_key: Option<SecretString>,
    pub chat_model: String,
    pub embedding_model: String,
    pub retrieval: RetrievalConfig,
    pub sessions: SessionConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3001)),
            secret: None,
            openai_api_key: None,
            chat_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            retrieval: RetrievalConfig::default(),
            sessions: SessionConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind = match get("FAQ_ASSIST_BIND") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
                key: "FAQ_ASSIST_BIND".to_string(),
                message: format!("{raw:?} is not a socket address: {e}"),
            })?,
            None => defaults.bind,
        };

        let retrieval = RetrievalConfig {
            corpus_path: get("FAQ_ASSIST_CORPUS")
                .map(PathBuf::from)
                .unwrap_or(defaults.retrieval.corpus_path),
            chunk_size: parse_or(
                "FAQ_ASSIST_CHUNK_SIZE",
                get("FAQ_ASSIST_CHUNK_SIZE"),
                defaults.retrieval.chunk_size,
            )?,
            chunk_overlap: parse_or(
                "FAQ_ASSIST_CHUNK_OVERLAP",
                get("FAQ_ASSIST_CHUNK_OVERLAP"),
                defaults.retrieval.chunk_overlap,
            )?,
            top_k: parse_or("FAQ_ASSIST_TOP_K", get("FAQ_ASSIST_TOP_K"), defaults.retrieval.top_k)?,
        };

        if retrieval.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "FAQ_ASSIST_CHUNK_SIZE".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if retrieval.chunk_overlap >= retrieval.chunk_size {
            return Err(ConfigError::InvalidValue {
                key: "FAQ_ASSIST_CHUNK_OVERLAP".to_string(),
                message: format!(
                    "overlap {} must be smaller than chunk size {}",
                    retrieval.chunk_overlap, retrieval.chunk_size
                ),
            });
        }
        if retrieval.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                key: "FAQ_ASSIST_TOP_K".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let idle_min: u64 = parse_or(
            "FAQ_ASSIST_SESSION_IDLE_MIN",
            get("FAQ_ASSIST_SESSION_IDLE_MIN"),
            defaults.sessions.idle_timeout.as_secs() / 60,
        )?;
        let sweep_secs: u64 = parse_or(
            "FAQ_ASSIST_SESSION_SWEEP_SECS",
            get("FAQ_ASSIST_SESSION_SWEEP_SECS"),
            defaults.sessions.sweep_interval.as_secs(),
        )?;

        Ok(Self {
            bind,
            secret: get("CHATBOT_SECRET").map(SecretString::from),
            openai_api_key: get("OPENAI_API_KEY").map(SecretString::from),
            chat_model: get("FAQ_ASSIST_CHAT_MODEL").unwrap_or(defaults.chat_model),
            embedding_model: get("FAQ_ASSIST_EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            retrieval,
            sessions: SessionConfig {
                idle_timeout: Duration::from_secs(idle_min * 60),
                sweep_interval: Duration::from_secs(sweep_secs.max(1)),
            },
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?}: {e}"),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind.to_string(), "127.0.0.1:3001");
        assert!(config.secret.is_none());
        assert_eq!(config.retrieval.chunk_size, 500);
        assert_eq!(config.retrieval.chunk_overlap, 50);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.sessions.idle_timeout, Duration::from_secs(3600));
    }

    #[test]
    fn reads_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("CHATBOT_SECRET", "hunter2"),
            ("FAQ_ASSIST_BIND", "0.0.0.0:8080"),
            ("FAQ_ASSIST_CORPUS", "/srv/faq.txt"),
            ("FAQ_ASSIST_TOP_K", "2"),
            ("FAQ_ASSIST_SESSION_IDLE_MIN", "5"),
        ]))
        .unwrap();
        assert_eq!(config.secret.unwrap().expose_secret(), "hunter2");
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.retrieval.corpus_path, PathBuf::from("/srv/faq.txt"));
        assert_eq!(config.retrieval.top_k, 2);
        assert_eq!(config.sessions.idle_timeout, Duration::from_secs(300));
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let config = ServiceConfig::from_lookup(lookup(&[("CHATBOT_SECRET", "  ")])).unwrap();
        assert!(config.secret.is_none());
    }

    #[test]
    fn rejects_garbage_numbers() {
        let err = ServiceConfig::from_lookup(lookup(&[("FAQ_ASSIST_TOP_K", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "FAQ_ASSIST_TOP_K"));
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk() {
        let err = ServiceConfig::from_lookup(lookup(&[
            ("FAQ_ASSIST_CHUNK_SIZE", "100"),
            ("FAQ_ASSIST_CHUNK_OVERLAP", "100"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "FAQ_ASSIST_CHUNK_OVERLAP"));
    }
}
