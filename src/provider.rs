use crate::persistence::load_embeddings;
use crate::storage::CorpusStore;
use crate::tfidf::{TfidfVectorizer, DEFAULT_MAX_FEATURES};
use crate::vector::VectorTable;
use crate::{RecommenderError, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// Produces one vector per article. Implementations are expensive and are
/// expected to run once per process.
pub trait VectorProvider {
    fn build(&self, corpus: &CorpusStore) -> Result<VectorTable>;
    fn name(&self) -> &'static str;
}

pub(crate) fn check_alignment(corpus: &CorpusStore, vectors: &VectorTable) -> Result<()> {
    if corpus.len() != vectors.len() {
        return Err(RecommenderError::DimensionMismatch {
            articles: corpus.len(),
            vectors: vectors.len(),
        });
    }
    Ok(())
}

/// Reads a precomputed embedding matrix without transforming it.
#[derive(Debug, Clone)]
pub struct PrecomputedEmbeddings {
    path: PathBuf,
}

impl PrecomputedEmbeddings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl VectorProvider for PrecomputedEmbeddings {
    fn build(&self, corpus: &CorpusStore) -> Result<VectorTable> {
        let vectors = load_embeddings(&self.path)?;
        check_alignment(corpus, &vectors)?;
        info!(
            path = %self.path.display(),
            rows = vectors.len(),
            dimension = vectors.dimension(),
            "loaded precomputed embeddings"
        );
        Ok(vectors)
    }

    fn name(&self) -> &'static str {
        "embeddings"
    }
}

/// Fits term weights over every article body.
#[derive(Debug, Clone)]
pub struct TfidfProvider {
    pub max_features: Option<usize>,
    pub min_df: usize,
    pub stop_words: bool,
}

impl Default for TfidfProvider {
    fn default() -> Self {
        Self {
            max_features: Some(DEFAULT_MAX_FEATURES),
            min_df: 1,
            stop_words: true,
        }
    }
}

impl TfidfProvider {
    fn vectorizer(&self) -> TfidfVectorizer {
        let vectorizer = TfidfVectorizer::new()
            .with_max_features(self.max_features)
            .with_min_df(self.min_df);
        if self.stop_words {
            vectorizer.with_stop_words_english()
        } else {
            vectorizer
        }
    }
}

impl VectorProvider for TfidfProvider {
    fn build(&self, corpus: &CorpusStore) -> Result<VectorTable> {
        let missing = corpus.articles().iter().filter(|a| a.content.is_none()).count();
        if missing > 0 {
            debug!(missing, "articles without body text get zero vectors");
        }

        let mut vectorizer = self.vectorizer();
        let matrix = vectorizer.fit_transform(&corpus.contents())?;
        let vectors = VectorTable::from_array(matrix)?;
        check_alignment(corpus, &vectors)?;
        info!(
            documents = vectors.len(),
            vocabulary = vectorizer.vocabulary_size(),
            "fitted term-frequency vectors"
        );
        Ok(vectors)
    }

    fn name(&self) -> &'static str {
        "tfidf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::Article;
    use crate::persistence::save_embeddings_json;

    fn corpus() -> CorpusStore {
        CorpusStore::from_articles(vec![
            Article::with_content(10, "Rust ownership", "ownership borrowing lifetimes in rust"),
            Article::with_content(20, "Rust traits", "traits generics in rust"),
            Article::with_content(30, "Sourdough", "flour water salt starter"),
        ])
        .unwrap()
    }

    #[test]
    fn tfidf_yields_one_row_per_article() {
        let vectors = TfidfProvider::default().build(&corpus()).unwrap();
        assert_eq!(vectors.len(), 3);
        assert!(vectors.dimension() > 0);
    }

    #[test]
    fn embedding_count_must_match_articles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.json");
        let table = VectorTable::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        save_embeddings_json(&table, &path).unwrap();

        let err = PrecomputedEmbeddings::new(&path).build(&corpus()).unwrap_err();
        assert!(matches!(
            err,
            RecommenderError::DimensionMismatch {
                articles: 3,
                vectors: 2
            }
        ));
    }

    #[test]
    fn missing_embedding_file_is_a_load_error() {
        let err = PrecomputedEmbeddings::new("/missing/vectors.npy")
            .build(&corpus())
            .unwrap_err();
        assert!(matches!(err, RecommenderError::LoadError(_)));
    }
}
