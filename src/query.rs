use crate::index::BruteForceIndex;
use crate::storage::CorpusStore;
use crate::utils::round_score;
use crate::vector::VectorTable;
use crate::{RecommenderError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DISPLAY_PLACES: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Score")]
    pub score: f32,
}

impl Recommendation {
    pub fn display_score(&self) -> f32 {
        round_score(self.score, DISPLAY_PLACES)
    }
}

/// The reference article's title and its neighbours, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub query_title: String,
    pub recommendations: Vec<Recommendation>,
}

impl Recommendations {
    pub fn len(&self) -> usize {
        self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}

pub struct Recommender<'a> {
    corpus: &'a CorpusStore,
    vectors: &'a VectorTable,
}

impl<'a> Recommender<'a> {
    pub fn new(corpus: &'a CorpusStore, vectors: &'a VectorTable) -> Self {
        Self { corpus, vectors }
    }

    /// Up to `top_n` articles most similar to `query_id`, never including the
    /// query article itself.
    pub fn recommend(&self, query_id: i64, top_n: usize) -> Result<Recommendations> {
        if top_n == 0 {
            return Err(RecommenderError::InvalidArgument(
                "top_n must be at least 1".to_string(),
            ));
        }

        let position = self
            .corpus
            .position_of(query_id)
            .ok_or(RecommenderError::NotFound(query_id))?;
        let query_article = self
            .corpus
            .get(position)
            .ok_or(RecommenderError::NotFound(query_id))?;
        let query = self
            .vectors
            .row(position)
            .ok_or(RecommenderError::NotFound(query_id))?;

        let ranked = BruteForceIndex::new(self.vectors).rank(query);

        let mut recommendations = Vec::with_capacity(top_n.min(ranked.len()));
        for (candidate, score) in ranked
            .into_iter()
            .filter(|(candidate, _)| *candidate != position)
            .take(top_n)
        {
            let article = self.corpus.get(candidate).ok_or_else(|| {
                RecommenderError::LoadError(format!("no article at row {}", candidate))
            })?;
            recommendations.push(Recommendation {
                id: article.id,
                title: article.title.clone(),
                score,
            });
        }

        debug!(
            query_id,
            top_n,
            returned = recommendations.len(),
            "recommendations computed"
        );

        Ok(Recommendations {
            query_title: query_article.title.clone(),
            recommendations,
        })
    }

    pub fn count_articles(&self) -> usize {
        self.corpus.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::Article;

    fn fixture() -> (CorpusStore, VectorTable) {
        let corpus = CorpusStore::from_articles(vec![
            Article::new(1, "A"),
            Article::new(2, "B"),
            Article::new(3, "C"),
        ])
        .unwrap();
        let vectors =
            VectorTable::from_rows(vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        (corpus, vectors)
    }

    #[test]
    fn returns_neighbours_best_first() {
        let (corpus, vectors) = fixture();
        let result = Recommender::new(&corpus, &vectors).recommend(1, 2).unwrap();

        assert_eq!(result.query_title, "A");
        let ids: Vec<i64> = result.recommendations.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(result.recommendations[0].score, 1.0);
        assert_eq!(result.recommendations[1].score, 0.0);
    }

    #[test]
    fn self_is_excluded_by_position_even_with_identical_scores() {
        let (corpus, vectors) = fixture();
        let result = Recommender::new(&corpus, &vectors).recommend(2, 5).unwrap();

        let ids: Vec<i64> = result.recommendations.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn zero_top_n_is_invalid() {
        let (corpus, vectors) = fixture();
        let err = Recommender::new(&corpus, &vectors).recommend(1, 0).unwrap_err();
        assert!(matches!(err, RecommenderError::InvalidArgument(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn unknown_id_is_not_found() {
        let (corpus, vectors) = fixture();
        let err = Recommender::new(&corpus, &vectors).recommend(99, 2).unwrap_err();
        assert!(matches!(err, RecommenderError::NotFound(99)));
    }

    #[test]
    fn single_article_corpus_yields_empty_result() {
        let corpus = CorpusStore::from_articles(vec![Article::new(42, "Only")]).unwrap();
        let vectors = VectorTable::from_rows(vec![vec![0.3, 0.4]]).unwrap();

        let result = Recommender::new(&corpus, &vectors).recommend(42, 3).unwrap();
        assert_eq!(result.query_title, "Only");
        assert!(result.is_empty());
    }

    #[test]
    fn serializes_to_wire_shape() {
        let (corpus, vectors) = fixture();
        let result = Recommender::new(&corpus, &vectors).recommend(3, 1).unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["query_title"], "C");
        assert_eq!(json["recommendations"][0]["ID"], 1);
        assert_eq!(json["recommendations"][0]["Title"], "A");
        assert!(json["recommendations"][0]["Score"].is_number());
    }
}
