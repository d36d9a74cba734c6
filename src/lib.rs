pub mod article;
pub mod catalog;
pub mod config;
pub mod index;
pub mod persistence;
pub mod provider;
pub mod query;
pub mod remote;
pub mod server;
pub mod storage;
pub mod telemetry;
pub mod tfidf;
pub mod utils;
pub mod vector;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommenderError {
    #[error("Load Error: {0}")]
    LoadError(String),
    #[error("Dimension Mismatch: {articles} articles but {vectors} vectors")]
    DimensionMismatch { articles: usize, vectors: usize },
    #[error("Duplicate article id {0}")]
    DuplicateId(i64),
    #[error("Article {0} not found")]
    NotFound(i64),
    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RecommenderError {
    /// Load-time failures halt startup; everything else is answered per request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RecommenderError::LoadError(_)
                | RecommenderError::DimensionMismatch { .. }
                | RecommenderError::DuplicateId(_)
                | RecommenderError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RecommenderError>;

// Re-export main types for convenience
pub use article::Article;
pub use catalog::{Catalog, CatalogCell};
pub use config::{AppConfig, DataConfig, ServerConfig, VectorSource};
pub use index::BruteForceIndex;
pub use persistence::{load_embeddings, save_embeddings_json, save_embeddings_npy, EmbeddingFormat};
pub use provider::{PrecomputedEmbeddings, TfidfProvider, VectorProvider};
pub use query::{Recommendation, Recommendations, Recommender};
pub use remote::RemoteClient;
pub use storage::{CorpusStore, PositionIndex};
pub use tfidf::TfidfVectorizer;
pub use utils::{cosine_similarity, round_score};
pub use vector::VectorTable;
