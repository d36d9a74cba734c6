use crate::{article::Article, RecommenderError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Maps article ID to its row in the vector table. IDs are never assumed
/// to equal positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionIndex {
    positions: HashMap<i64, usize>,
}

impl PositionIndex {
    fn build(articles: &[Article]) -> Result<Self> {
        let mut positions = HashMap::with_capacity(articles.len());
        for (position, article) in articles.iter().enumerate() {
            if positions.insert(article.id, position).is_some() {
                return Err(RecommenderError::DuplicateId(article.id));
            }
        }
        Ok(Self { positions })
    }

    pub fn get(&self, id: i64) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Read-only article records in load order.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    articles: Vec<Article>,
    index: PositionIndex,
}

impl CorpusStore {
    pub fn from_articles(articles: Vec<Article>) -> Result<Self> {
        if let Some(article) = articles.iter().find(|a| a.title.trim().is_empty()) {
            return Err(RecommenderError::LoadError(format!(
                "article {} has an empty title",
                article.id
            )));
        }

        let index = PositionIndex::build(&articles)?;
        Ok(Self { articles, index })
    }

    /// Loads a JSON array of records, or JSON Lines when the extension is `.jsonl`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            RecommenderError::LoadError(format!("Failed to read articles from {}: {}", path.display(), e))
        })?;

        let is_lines = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("jsonl"));

        let articles = if is_lines {
            contents
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(n, line)| {
                    serde_json::from_str::<Article>(line).map_err(|e| {
                        RecommenderError::LoadError(format!(
                            "Malformed article on line {} of {}: {}",
                            n + 1,
                            path.display(),
                            e
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            serde_json::from_str::<Vec<Article>>(&contents).map_err(|e| {
                RecommenderError::LoadError(format!("Malformed articles in {}: {}", path.display(), e))
            })?
        };

        Self::from_articles(articles)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn position_of(&self, id: i64) -> Option<usize> {
        self.index.get(id)
    }

    pub fn get(&self, position: usize) -> Option<&Article> {
        self.articles.get(position)
    }

    pub fn get_by_id(&self, id: i64) -> Option<&Article> {
        self.position_of(id).and_then(|position| self.get(position))
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn contents(&self) -> Vec<&str> {
        self.articles.iter().map(Article::body).collect()
    }

    pub fn index(&self) -> &PositionIndex {
        &self.index
    }
}
