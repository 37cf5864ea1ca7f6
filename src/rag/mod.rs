//! Retrieval-augmented answering over the FAQ corpus.
//!
//! corpus file → `TextSplitter` → `MemoryIndex` (embeddings) → `AnswerEngine`
//! (top-K fragments + chat model). `RetrievalBinding` owns the one engine
//! the process shares and builds it on first use.

pub mod binding;
pub mod corpus;
pub mod engine;
pub mod index;
pub mod splitter;

pub use binding::{BindingStatus, RetrievalBinding};
pub use corpus::{Document, load_corpus};
pub use engine::{AnswerEngine, CorpusEngineFactory, EngineFactory};
pub use index::{Fragment, MemoryIndex, Retriever, ScoredFragment, cosine_similarity};
pub use splitter::TextSplitter;
