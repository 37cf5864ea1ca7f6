//! In-memory vector index and the `Retriever` trait.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info};

use crate::error::{LlmError, RetrievalError};
use crate::llm::Embedder;

/// Texts per embedding request.
const EMBED_BATCH_SIZE: usize = 64;

/// Embedding requests in flight while building the index.
const EMBED_CONCURRENCY: usize = 4;

/// A piece of the corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub id: usize,
    pub source: String,
    pub text: String,
}

/// A fragment with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredFragment {
    pub fragment: Fragment,
    pub score: f64,
}

/// Returns the fragments most relevant to a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Up to `k` fragments, best first.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredFragment>, RetrievalError>;
}

/// Brute-force cosine-similarity index held in memory.
pub struct MemoryIndex {
    entries: Vec<(Fragment, Vec<f64>)>,
    dimensions: usize,
    embedder: Arc<dyn Embedder>,
}

impl MemoryIndex {
    /// Embed every fragment and build the index.
    pub async fn build(
        fragments: Vec<Fragment>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, RetrievalError> {
        let batches: Vec<Vec<String>> = fragments
            .chunks(EMBED_BATCH_SIZE)
            .map(|batch| batch.iter().map(|f| f.text.clone()).collect())
            .collect();

        let embedded: Vec<Vec<Vec<f64>>> = stream::iter(batches)
            .map(|batch| {
                let embedder = Arc::clone(&embedder);
                async move { embedder.embed(batch).await }
            })
            .buffered(EMBED_CONCURRENCY)
            .try_collect()
            .await
            .map_err(RetrievalError::Embedding)?;
        let vectors: Vec<Vec<f64>> = embedded.into_iter().flatten().collect();

        if vectors.len() != fragments.len() {
            return Err(RetrievalError::Embedding(LlmError::InvalidResponse {
                provider: embedder.model_name().to_string(),
                reason: format!(
                    "expected {} embeddings, got {}",
                    fragments.len(),
                    vectors.len()
                ),
            }));
        }

        let dimensions = vectors.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
            return Err(RetrievalError::DimensionMismatch {
                expected: dimensions,
                actual: bad.len(),
            });
        }

        info!(
            fragments = fragments.len(),
            dimensions,
            model = embedder.model_name(),
            "Vector index built"
        );

        Ok(Self {
            entries: fragments.into_iter().zip(vectors).collect(),
            dimensions,
            embedder,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank stored fragments against an already-embedded query.
    pub fn search(&self, query: &[f64], k: usize) -> Result<Vec<ScoredFragment>, RetrievalError> {
        if !self.entries.is_empty() && query.len() != self.dimensions {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut scored: Vec<ScoredFragment> = self
            .entries
            .iter()
            .map(|(fragment, vector)| ScoredFragment {
                fragment: fragment.clone(),
                score: cosine_similarity(query, vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.fragment.id.cmp(&b.fragment.id))
        });
        scored.truncate(k);
        Ok(scored)
    }
}

#[async_trait]
impl Retriever for MemoryIndex {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredFragment>, RetrievalError> {
        let mut embedded = self
            .embedder
            .embed(vec![query.to_string()])
            .await
            .map_err(RetrievalError::Embedding)?;
        let vector = embedded.pop().ok_or_else(|| {
            RetrievalError::Embedding(LlmError::InvalidResponse {
                provider: self.embedder.model_name().to_string(),
                reason: "no embedding returned for query".to_string(),
            })
        })?;

        let hits = self.search(&vector, k)?;
        debug!(
            hits = hits.len(),
            top_score = hits.first().map(|h| h.score),
            "Retrieved fragments"
        );
        Ok(hits)
    }
}

/// Cosine similarity; 0 when either vector has zero length.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Embeds text as counts of a few keywords.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        fn model_name(&self) -> &str {
            "keywords"
        }
        async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>, LlmError> {
            Ok(texts
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    ["premium", "deductible", "hra"]
                        .iter()
                        .map(|k| t.matches(k).count() as f64)
                        .collect()
                })
                .collect())
        }
    }

    fn fragments(texts: &[&str]) -> Vec<Fragment> {
        texts
            .iter()
            .enumerate()
            .map(|(id, text)| Fragment {
                id,
                source: "faq.txt".to_string(),
                text: text.to_string(),
            })
            .collect()
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn retrieves_most_similar_first() {
        let index = MemoryIndex::build(
            fragments(&[
                "The premium is what you pay each month.",
                "The deductible applies before coverage.",
                "An HRA reimburses expenses.",
            ]),
            Arc::new(KeywordEmbedder),
        )
        .await
        .unwrap();
        assert_eq!(index.len(), 3);

        let hits = index.retrieve("how much is the deductible?", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].fragment.id, 1);
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn k_larger_than_index_returns_everything() {
        let index = MemoryIndex::build(fragments(&["premium", "hra"]), Arc::new(KeywordEmbedder))
            .await
            .unwrap();
        let hits = index.retrieve("premium", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn rejects_query_of_wrong_dimension() {
        let index = MemoryIndex::build(fragments(&["premium"]), Arc::new(KeywordEmbedder))
            .await
            .unwrap();
        let err = index.search(&[1.0], 1).unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::DimensionMismatch { expected: 3, actual: 1 }
        ));
    }
}
