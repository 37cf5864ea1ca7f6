//! Corpus loading.

use std::path::Path;

use tokio::fs;
use tracing::info;

use crate::error::RetrievalError;

/// A loaded source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Where the text came from (file path).
    pub source: String,
    pub text: String,
}

/// Read the corpus file in full. The corpus is a single text document.
pub async fn load_corpus(path: &Path) -> Result<Vec<Document>, RetrievalError> {
    let source = path.display().to_string();
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| RetrievalError::CorpusLoad {
            path: source.clone(),
            source: e,
        })?;

    info!(path = %source, bytes = text.len(), "Corpus loaded");
    Ok(vec![Document { source, text }])
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn loads_whole_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Q: What is an HRA?\nA: A health reimbursement arrangement.").unwrap();

        let docs = load_corpus(file.path()).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].text.starts_with("Q: What is an HRA?"));
        assert_eq!(docs[0].source, file.path().display().to_string());
    }

    #[tokio::test]
    async fn missing_file_is_a_corpus_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_corpus(&dir.path().join("nope.txt")).await.unwrap_err();
        assert!(matches!(err, RetrievalError::CorpusLoad { .. }));
    }
}
