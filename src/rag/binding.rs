//! The process-wide answer engine, built lazily once.
//!
//! The first request that needs an answer builds the engine. Concurrent
//! first requests wait for that single build instead of starting their own.
//! A failed build is not cached: the next request to arrive afterwards tries
//! again. Requests that were already waiting on the failed build share its
//! failure rather than each retrying in turn.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use super::engine::{AnswerEngine, EngineFactory};
use crate::error::RetrievalError;

/// Lifecycle of the binding.
enum BindingState {
    NotStarted,
    InProgress { attempt: u32 },
    Ready(Arc<AnswerEngine>),
    Failed { attempts: u32, last_error: String },
}

/// Externally visible view of the binding state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BindingStatus {
    NotStarted,
    InProgress { attempt: u32 },
    Ready,
    Failed { attempts: u32, last_error: String },
}

/// Lazily-built, shared answer engine.
pub struct RetrievalBinding {
    factory: Arc<dyn EngineFactory>,
    state: RwLock<BindingState>,
    /// Held for the whole duration of a build.
    init_lock: Mutex<()>,
}

impl RetrievalBinding {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Arc<Self> {
        Arc::new(Self {
            factory,
            state: RwLock::new(BindingState::NotStarted),
            init_lock: Mutex::new(()),
        })
    }

    /// Current lifecycle state.
    pub async fn status(&self) -> BindingStatus {
        match &*self.state.read().await {
            BindingState::NotStarted => BindingStatus::NotStarted,
            BindingState::InProgress { attempt } => BindingStatus::InProgress { attempt: *attempt },
            BindingState::Ready(_) => BindingStatus::Ready,
            BindingState::Failed {
                attempts,
                last_error,
            } => BindingStatus::Failed {
                attempts: *attempts,
                last_error: last_error.clone(),
            },
        }
    }

    /// The engine, building it first if needed.
    pub async fn engine(&self) -> Result<Arc<AnswerEngine>, RetrievalError> {
        let seen_attempts = match &*self.state.read().await {
            BindingState::Ready(engine) => return Ok(Arc::clone(engine)),
            BindingState::NotStarted => 0,
            BindingState::InProgress { attempt } => attempt.saturating_sub(1),
            BindingState::Failed { attempts, .. } => *attempts,
        };

        let _guard = self.init_lock.lock().await;

        let attempt = match &*self.state.read().await {
            BindingState::Ready(engine) => return Ok(Arc::clone(engine)),
            BindingState::Failed {
                attempts,
                last_error,
            } if *attempts > seen_attempts => {
                // The build this request waited on failed.
                return Err(RetrievalError::Initialization(last_error.clone()));
            }
            BindingState::Failed { attempts, .. } => attempts + 1,
            BindingState::InProgress { attempt } => *attempt,
            BindingState::NotStarted => 1,
        };

        *self.state.write().await = BindingState::InProgress { attempt };
        if attempt > 1 {
            warn!(attempt, "Retrying retrieval binding initialization");
        } else {
            info!("Initializing retrieval binding");
        }

        match self.factory.build().await {
            Ok(engine) => {
                let engine = Arc::new(engine);
                *self.state.write().await = BindingState::Ready(Arc::clone(&engine));
                info!(attempt, "Retrieval binding ready");
                Ok(engine)
            }
            Err(e) => {
                error!(attempt, error = %e, "Retrieval binding initialization failed");
                *self.state.write().await = BindingState::Failed {
                    attempts: attempt,
                    last_error: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Answer a question through the (lazily built) engine.
    pub async fn answer(&self, question: &str) -> Result<String, RetrievalError> {
        self.engine().await?.answer(question).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::LlmError;
    use crate::llm::ChatModel;
    use crate::rag::index::{Retriever, ScoredFragment};

    struct NoContext;

    #[async_trait]
    impl Retriever for NoContext {
        async fn retrieve(&self, _q: &str, _k: usize) -> Result<Vec<ScoredFragment>, RetrievalError> {
            Ok(vec![])
        }
    }

    struct Echo;

    #[async_trait]
    impl ChatModel for Echo {
        fn model_name(&self) -> &str {
            "echo"
        }
        async fn complete(&self, _preamble: &str, prompt: &str) -> Result<String, LlmError> {
            Ok(prompt.to_string())
        }
    }

    /// Fails the first `failures` builds, then succeeds. Each build is slow.
    struct FlakyFactory {
        builds: AtomicU32,
        failures: u32,
    }

    impl FlakyFactory {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                builds: AtomicU32::new(0),
                failures,
            })
        }
    }

    #[async_trait]
    impl EngineFactory for FlakyFactory {
        async fn build(&self) -> Result<AnswerEngine, RetrievalError> {
            let n = self.builds.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(Duration::from_millis(20)).await;
            if n <= self.failures {
                return Err(RetrievalError::EmptyCorpus {
                    path: format!("attempt-{n}"),
                });
            }
            Ok(AnswerEngine::new(Arc::new(NoContext), Arc::new(Echo), 4))
        }
    }

    #[tokio::test]
    async fn builds_once_and_reuses() {
        let factory = FlakyFactory::new(0);
        let binding = RetrievalBinding::new(factory.clone());
        assert_eq!(binding.status().await, BindingStatus::NotStarted);

        let first = binding.engine().await.unwrap();
        let second = binding.engine().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
        assert_eq!(binding.status().await, BindingStatus::Ready);
    }

    #[tokio::test]
    async fn failure_is_retried_on_next_request() {
        let factory = FlakyFactory::new(1);
        let binding = RetrievalBinding::new(factory.clone());

        assert!(binding.answer("q").await.is_err());
        assert!(matches!(
            binding.status().await,
            BindingStatus::Failed { attempts: 1, .. }
        ));

        let answer = binding.answer("q").await.unwrap();
        assert!(answer.contains("Question: q"));
        assert_eq!(factory.builds.load(Ordering::SeqCst), 2);
        assert_eq!(binding.status().await, BindingStatus::Ready);
    }

    #[tokio::test]
    async fn concurrent_first_requests_build_once() {
        let factory = FlakyFactory::new(0);
        let binding = RetrievalBinding::new(factory.clone());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let binding = Arc::clone(&binding);
                tokio::spawn(async move { binding.engine().await.map(|_| ()) })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn waiters_share_a_failed_build() {
        let factory = FlakyFactory::new(1);
        let binding = RetrievalBinding::new(factory.clone());

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let binding = Arc::clone(&binding);
                tokio::spawn(async move { binding.engine().await.map(|_| ()) })
            })
            .collect();
        let results: Vec<_> = futures::future::join_all(tasks).await;
        assert!(results.into_iter().all(|r| r.unwrap().is_err()));
        assert_eq!(factory.builds.load(Ordering::SeqCst), 1);

        // A later request retries.
        assert!(binding.engine().await.is_ok());
        assert_eq!(factory.builds.load(Ordering::SeqCst), 2);
    }
}
