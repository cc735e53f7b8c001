//! TF-IDF vectorizer over a capped, frozen vocabulary.
//!
//! Fit:
//! 1. Tokenize every document (runs of ASCII alphanumerics, length ≥ 2).
//! 2. Drop English stop words.
//! 3. Keep the `max_features` terms with the highest total corpus count
//!    (ties broken lexicographically) and index them in lexicographic order.
//! 4. IDF per kept term: `ln((1 + n_docs) / (1 + df)) + 1`.
//!
//! Transform: raw counts over the vocabulary × IDF, then L2-normalized.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::stop_words::is_stop_word;
use crate::model::ModelError;

pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Sparse feature vector. Entries are sorted by feature index and unique.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    tokens: Vec<String>,
    idf: Vec<f64>,
    index: HashMap<String, usize>,
}

impl TfidfVectorizer {
    pub fn fit<S: AsRef<str>>(corpus: &[S], max_features: usize) -> Result<Self, ModelError> {
        if corpus.is_empty() {
            return Err(ModelError::EmptyCorpus);
        }
        if max_features == 0 {
            return Err(ModelError::InvalidParameter(
                "max_features must be at least 1".to_string(),
            ));
        }

        let mut term_counts: HashMap<&str, u64> = HashMap::new();
        let mut doc_freq: HashMap<&str, u64> = HashMap::new();
        for doc in corpus {
            let mut seen = HashSet::new();
            for token in tokenize(doc.as_ref()).filter(|t| !is_stop_word(t)) {
                *term_counts.entry(token).or_insert(0) += 1;
                if seen.insert(token) {
                    *doc_freq.entry(token).or_insert(0) += 1;
                }
            }
        }
        if term_counts.is_empty() {
            return Err(ModelError::EmptyVocabulary);
        }

        let mut ranked: Vec<(&str, u64)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_features);

        let mut tokens: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
        tokens.sort();

        let n_docs = corpus.len() as f64;
        let idf = tokens
            .iter()
            .map(|t| {
                let df = doc_freq.get(t.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        Self::from_parts(tokens, idf)
    }

    /// Rebuilds a fitted vectorizer from its persisted token and IDF lists.
    pub fn from_parts(tokens: Vec<String>, idf: Vec<f64>) -> Result<Self, ModelError> {
        if tokens.len() != idf.len() {
            return Err(ModelError::ShapeMismatch(format!(
                "{} tokens but {} idf weights",
                tokens.len(),
                idf.len()
            )));
        }
        if let Some(bad) = idf.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "idf weight {bad} is not a positive finite number"
            )));
        }

        let mut index = HashMap::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            if index.insert(token.clone(), i).is_some() {
                return Err(ModelError::InvalidParameter(format!(
                    "duplicate vocabulary token '{token}'"
                )));
            }
        }

        Ok(Self { tokens, idf, index })
    }

    /// Vectorizes cleaned text. Out-of-vocabulary tokens are dropped.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokenize(text) {
            if let Some(&i) = self.index.get(token) {
                *counts.entry(i).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(i, count)| (i, count * self.idf[i]))
            .collect();

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut entries {
                *v /= norm;
            }
        }

        SparseVector {
            dim: self.tokens.len(),
            entries,
        }
    }

    pub fn transform_all<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SparseVector> {
        texts.iter().map(|t| self.transform(t.as_ref())).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn feature_index(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| t.len() >= 2)
}
