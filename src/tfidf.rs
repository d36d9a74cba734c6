//! Term-weighting transform over article bodies.
//!
//! ```text
//! tfidf(t, d) = tf(t, d) × idf(t)
//! tf(t, d)    = count of term t in document d
//! idf(t)      = ln((1 + n) / (1 + df(t))) + 1
//! ```
//!
//! Each document row is then scaled to unit length.

use crate::{RecommenderError, Result};
use ndarray::Array2;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_MAX_FEATURES: usize = 5000;

pub const ENGLISH_STOP_WORDS: &[&str] = &[
    // articles, determiners
    "a", "an", "the", "this", "that", "these", "those", "all", "any", "both", "each", "every",
    "few", "more", "most", "much", "many", "some", "such", "no", "none", "not", "nor", "only",
    "own", "same", "other", "another", "several", "either", "neither",
    // pronouns
    "i", "me", "my", "myself", "we", "us", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves",
    // questions
    "what", "which", "who", "whom", "whose", "why", "when", "where", "how",
    // prepositions
    "about", "above", "across", "after", "against", "along", "among", "around", "at", "before",
    "behind", "below", "beneath", "beside", "between", "beyond", "by", "down", "during", "for",
    "from", "in", "inside", "into", "near", "of", "off", "on", "onto", "out", "outside", "over",
    "through", "throughout", "to", "toward", "towards", "under", "until", "up", "upon", "via",
    "with", "within", "without",
    // conjunctions
    "and", "as", "because", "but", "if", "or", "since", "so", "than", "though", "unless",
    "while", "whether", "yet",
    // auxiliaries
    "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "having",
    "do", "does", "did", "doing", "would", "should", "could", "can", "cannot", "may", "might",
    "must", "will", "shall",
    // adverbs
    "again", "also", "already", "always", "even", "ever", "here", "there", "then", "now",
    "just", "very", "too", "once", "still", "never", "often", "however", "therefore", "thus",
];

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: Option<usize>,
    min_df: usize,
    lowercase: bool,
    stop_words: Option<HashSet<String>>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self {
            max_features: Some(DEFAULT_MAX_FEATURES),
            min_df: 1,
            lowercase: true,
            stop_words: None,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_stop_words_english(mut self) -> Self {
        self.stop_words = Some(ENGLISH_STOP_WORDS.iter().map(|w| w.to_string()).collect());
        self
    }

    #[must_use]
    pub fn with_stop_words(mut self, words: &[&str]) -> Self {
        self.stop_words = Some(words.iter().map(|w| w.to_lowercase()).collect());
        self
    }

    /// Caps the vocabulary to the most frequent terms; `None` keeps every term.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Terms present in fewer than `min_df` documents are dropped.
    #[must_use]
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df.max(1);
        self
    }

    #[must_use]
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|token| token.chars().count() >= 2)
            .map(|token| {
                if self.lowercase {
                    token.to_lowercase()
                } else {
                    token.to_string()
                }
            })
            .filter(|token| {
                self.stop_words
                    .as_ref()
                    .map_or(true, |stop| !stop.contains(token))
            })
            .collect()
    }

    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(RecommenderError::LoadError(
                "Cannot fit term weights on an empty corpus".to_string(),
            ));
        }

        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let tokens = self.tokenize(doc.as_ref());
            let mut seen: HashSet<&str> = HashSet::new();
            for token in &tokens {
                *term_freq.entry(token.clone()).or_insert(0) += 1;
                if seen.insert(token.as_str()) {
                    *doc_freq.entry(token.clone()).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(String, usize)> = term_freq
            .into_iter()
            .filter(|(term, _)| doc_freq.get(term).copied().unwrap_or(0) >= self.min_df)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(max_features) = self.max_features {
            ranked.truncate(max_features);
        }

        if ranked.is_empty() {
            return Err(RecommenderError::LoadError(
                "No terms left after tokenization and stop-word filtering".to_string(),
            ));
        }

        let n_docs = documents.len() as f32;
        self.idf = ranked
            .iter()
            .map(|(term, _)| {
                let df = doc_freq[term] as f32;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.vocabulary = ranked
            .into_iter()
            .enumerate()
            .map(|(column, (term, _))| (term, column))
            .collect();

        Ok(())
    }

    /// One L2-normalized row per document; documents with no known terms map to zeros.
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<Array2<f32>> {
        if self.vocabulary.is_empty() {
            return Err(RecommenderError::LoadError(
                "Vocabulary is empty. Call fit() first".to_string(),
            ));
        }

        let mut matrix = Array2::<f32>::zeros((documents.len(), self.vocabulary.len()));
        for (row, doc) in documents.iter().enumerate() {
            for token in self.tokenize(doc.as_ref()) {
                if let Some(&column) = self.vocabulary.get(&token) {
                    matrix[[row, column]] += 1.0;
                }
            }
        }

        for mut row in matrix.rows_mut() {
            row.iter_mut()
                .zip(&self.idf)
                .for_each(|(value, idf)| *value *= idf);
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|v| v / norm);
            }
        }

        Ok(matrix)
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Array2<f32>> {
        self.fit(documents)?;
        self.transform(documents)
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}
