use crate::provider::{PrecomputedEmbeddings, TfidfProvider, VectorProvider};
use crate::tfidf::DEFAULT_MAX_FEATURES;
use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "recommender.toml";

/// Top-level settings read from `recommender.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Number of recommendations returned when a caller does not ask for a count.
    #[serde(default = "AppConfig::default_top_n")]
    pub default_top_n: usize,
}

impl AppConfig {
    fn default_top_n() -> usize {
        5
    }

    /// Reads `explicit` if given, else `recommender.toml` in the working
    /// directory, else defaults. An explicit path that does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let (candidate, explicit_provided) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let config = if candidate.exists() {
            let raw = std::fs::read_to_string(&candidate)
                .with_context(|| format!("failed to read configuration from {}", candidate.display()))?;
            Self::from_toml(&raw)
                .with_context(|| format!("failed to parse configuration at {}", candidate.display()))?
        } else if explicit_provided {
            bail!("configuration file not found at {}", candidate.display());
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw)?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_top_n == 0 {
            bail!("default_top_n must be at least 1");
        }
        if let VectorSource::Tfidf { max_features: Some(0), .. } = self.data.vectors {
            bail!("tfidf max_features must be at least 1");
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            server: ServerConfig::default(),
            default_top_n: Self::default_top_n(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DataConfig {
    #[serde(default = "DataConfig::default_articles")]
    pub articles: PathBuf,
    #[serde(default)]
    pub vectors: VectorSource,
}

impl DataConfig {
    fn default_articles() -> PathBuf {
        PathBuf::from("data/articles.json")
    }

    pub fn provider(&self) -> Box<dyn VectorProvider + Send + Sync> {
        match &self.vectors {
            VectorSource::Embeddings { path } => Box::new(PrecomputedEmbeddings::new(path.clone())),
            VectorSource::Tfidf {
                max_features,
                min_df,
                stop_words,
            } => Box::new(TfidfProvider {
                max_features: *max_features,
                min_df: *min_df,
                stop_words: *stop_words,
            }),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            articles: Self::default_articles(),
            vectors: VectorSource::default(),
        }
    }
}

/// Where article vectors come from. Exactly one source per deployment.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum VectorSource {
    Embeddings {
        path: PathBuf,
    },
    Tfidf {
        #[serde(default = "default_max_features")]
        max_features: Option<usize>,
        #[serde(default = "default_min_df")]
        min_df: usize,
        #[serde(default = "default_stop_words")]
        stop_words: bool,
    },
}

fn default_max_features() -> Option<usize> {
    Some(DEFAULT_MAX_FEATURES)
}

fn default_min_df() -> usize {
    1
}

fn default_stop_words() -> bool {
    true
}

impl Default for VectorSource {
    fn default() -> Self {
        VectorSource::Embeddings {
            path: PathBuf::from("data/embeddings_w2v.npy"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_bind")]
    pub bind: String,
}

impl ServerConfig {
    fn default_bind() -> String {
        "127.0.0.1:8080".to_string()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.default_top_n, 5);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn parses_tfidf_source() {
        let config = AppConfig::from_toml(
            r#"
            default_top_n = 3

            [data]
            articles = "corpus/articles.jsonl"

            [data.vectors]
            source = "tfidf"
            max_features = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.default_top_n, 3);
        assert_eq!(config.data.articles, PathBuf::from("corpus/articles.jsonl"));
        assert_eq!(
            config.data.vectors,
            VectorSource::Tfidf {
                max_features: Some(1000),
                min_df: 1,
                stop_words: true
            }
        );
        assert_eq!(config.data.provider().name(), "tfidf");
    }

    #[test]
    fn parses_embedding_source() {
        let config = AppConfig::from_toml(
            r#"
            [data.vectors]
            source = "embeddings"
            path = "vectors.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.data.provider().name(), "embeddings");
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let config = AppConfig::from_toml("default_top_n = 0").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(AppConfig::load(Some(Path::new("/nope/recommender.toml"))).is_err());
    }

    #[test]
    fn loads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0:9000\"\n").unwrap();

        let config = AppConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
    }
}
