//! Grounded answers from retrieved fragments.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::corpus::load_corpus;
use super::index::{Fragment, MemoryIndex, Retriever, ScoredFragment};
use super::splitter::TextSplitter;
use crate::config::RetrievalConfig;
use crate::error::RetrievalError;
use crate::llm::{ChatModel, Providers};

const ANSWER_PREAMBLE: &str = "Use the following pieces of context to answer the question \
     at the end. If you don't know the answer, just say that you don't know, don't try to \
     make up an answer.";

/// Answers questions from the fragments a retriever returns.
pub struct AnswerEngine {
    retriever: Arc<dyn Retriever>,
    chat: Arc<dyn ChatModel>,
    top_k: usize,
}

impl AnswerEngine {
    pub fn new(retriever: Arc<dyn Retriever>, chat: Arc<dyn ChatModel>, top_k: usize) -> Self {
        Self {
            retriever,
            chat,
            top_k,
        }
    }

    /// Retrieve context for `question` and ask the model.
    pub async fn answer(&self, question: &str) -> Result<String, RetrievalError> {
        let hits = self.retriever.retrieve(question, self.top_k).await?;
        let prompt = build_prompt(question, &hits);
        debug!(
            fragments = hits.len(),
            model = self.chat.model_name(),
            "Asking model"
        );
        let answer = self.chat.complete(ANSWER_PREAMBLE, &prompt).await?;
        Ok(answer.trim().to_string())
    }
}

/// Context block followed by the question.
fn build_prompt(question: &str, hits: &[ScoredFragment]) -> String {
    let context = hits
        .iter()
        .map(|h| h.fragment.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{context}\n\nQuestion: {question}\nHelpful Answer:")
}

/// Builds an `AnswerEngine` from scratch.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn build(&self) -> Result<AnswerEngine, RetrievalError>;
}

/// Load → split → embed → index, over the configured corpus file.
pub struct CorpusEngineFactory {
    corpus_path: PathBuf,
    splitter: TextSplitter,
    top_k: usize,
    providers: Providers,
}

impl CorpusEngineFactory {
    pub fn new(config: &RetrievalConfig, providers: Providers) -> Self {
        Self {
            corpus_path: config.corpus_path.clone(),
            splitter: TextSplitter::new(config.chunk_size, config.chunk_overlap),
            top_k: config.top_k,
            providers,
        }
    }
}

#[async_trait]
impl EngineFactory for CorpusEngineFactory {
    async fn build(&self) -> Result<AnswerEngine, RetrievalError> {
        let documents = load_corpus(&self.corpus_path).await?;

        let fragments: Vec<Fragment> = documents
            .iter()
            .flat_map(|doc| {
                self.splitter
                    .split(&doc.text)
                    .into_iter()
                    .map(move |text| (doc.source.clone(), text))
            })
            .enumerate()
            .map(|(id, (source, text))| Fragment { id, source, text })
            .collect();

        if fragments.is_empty() {
            return Err(RetrievalError::EmptyCorpus {
                path: self.corpus_path.display().to_string(),
            });
        }
        info!(fragments = fragments.len(), "Corpus split");

        let index = MemoryIndex::build(fragments, Arc::clone(&self.providers.embedder)).await?;
        Ok(AnswerEngine::new(
            Arc::new(index),
            Arc::clone(&self.providers.chat),
            self.top_k,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::LlmError;
    use crate::llm::Embedder;

    struct FixedRetriever(Vec<&'static str>);

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(
            &self,
            _query: &str,
            k: usize,
        ) -> Result<Vec<ScoredFragment>, RetrievalError> {
            Ok(self
                .0
                .iter()
                .take(k)
                .enumerate()
                .map(|(id, text)| ScoredFragment {
                    fragment: Fragment {
                        id,
                        source: "faq.txt".to_string(),
                        text: text.to_string(),
                    },
                    score: 1.0,
                })
                .collect())
        }
    }

    /// Records the prompt and answers with a fixed string.
    #[derive(Default)]
    struct RecordingChat {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatModel for RecordingChat {
        fn model_name(&self) -> &str {
            "recording"
        }
        async fn complete(&self, _preamble: &str, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("  An HRA reimburses medical expenses.  ".to_string())
        }
    }

    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        fn model_name(&self) -> &str {
            "length"
        }
        async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>, LlmError> {
            Ok(texts.iter().map(|t| vec![t.len() as f64, 1.0]).collect())
        }
    }

    #[tokio::test]
    async fn prompt_contains_context_and_question() {
        let chat = Arc::new(RecordingChat::default());
        let engine = AnswerEngine::new(
            Arc::new(FixedRetriever(vec!["HRA means health reimbursement arrangement.", "unused"])),
            chat.clone(),
            1,
        );

        let answer = engine.answer("What is an HRA?").await.unwrap();
        assert_eq!(answer, "An HRA reimburses medical expenses.");

        let prompts = chat.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("HRA means health reimbursement arrangement."));
        assert!(!prompts[0].contains("unused"));
        assert!(prompts[0].contains("Question: What is an HRA?"));
    }

    #[tokio::test]
    async fn factory_builds_from_corpus_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.txt");
        std::fs::write(&path, "Q: What is an HRA?\n\nA: A reimbursement arrangement.").unwrap();

        let config = RetrievalConfig {
            corpus_path: path,
            ..RetrievalConfig::default()
        };
        let providers = Providers {
            embedder: Arc::new(LengthEmbedder),
            chat: Arc::new(RecordingChat::default()),
        };
        let engine = CorpusEngineFactory::new(&config, providers).build().await.unwrap();
        assert!(engine.answer("anything").await.is_ok());
    }

    #[tokio::test]
    async fn factory_rejects_blank_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.txt");
        std::fs::write(&path, "\n\n   \n").unwrap();

        let config = RetrievalConfig {
            corpus_path: path,
            ..RetrievalConfig::default()
        };
        let providers = Providers {
            embedder: Arc::new(LengthEmbedder),
            chat: Arc::new(RecordingChat::default()),
        };
        let err = CorpusEngineFactory::new(&config, providers)
            .build()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RetrievalError::EmptyCorpus { .. }));
    }
}
