//! TF-IDF vectorization over a small in-memory corpus

use crate::error::{Result, ScorerError};
use crate::processing::stop_words::is_stop_word;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

static WORD_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("Invalid word token regex"));

/// Fitted TF-IDF model: one L2-normalized sparse row per document.
#[derive(Debug, Clone)]
pub struct TfIdfMatrix {
    pub vocabulary: BTreeMap<String, usize>,
    pub idf: Vec<f64>,
    pub rows: Vec<HashMap<usize, f64>>,
}

#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    max_features: usize,
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl TfIdfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self { max_features }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        WORD_TOKEN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !is_stop_word(t))
            .map(|t| t.to_string())
            .collect()
    }

    /// Fit on `documents` and transform them.
    ///
    /// Features are capped at `max_features` by corpus frequency (ties by term);
    /// IDF is smoothed as `ln((1 + n) / (1 + df)) + 1`.
    pub fn fit_transform(&self, documents: &[&str]) -> Result<TfIdfMatrix> {
        if documents.is_empty() {
            return Err(ScorerError::Vectorization("no documents to vectorize".to_string()));
        }
        if self.max_features == 0 {
            return Err(ScorerError::Vectorization("max_features must be positive".to_string()));
        }

        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| self.tokenize(d)).collect();

        let mut corpus_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let mut seen = HashSet::new();
            for token in tokens {
                *corpus_freq.entry(token.as_str()).or_insert(0) += 1;
                if seen.insert(token.as_str()) {
                    *doc_freq.entry(token.as_str()).or_insert(0) += 1;
                }
            }
        }

        if corpus_freq.is_empty() {
            return Err(ScorerError::Vectorization(
                "empty vocabulary; documents contain only stop words".to_string(),
            ));
        }

        let mut ranked: Vec<(&str, usize)> = corpus_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);

        let mut terms: Vec<&str> = ranked.into_iter().map(|(t, _)| t).collect();
        terms.sort_unstable();
        let vocabulary: BTreeMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();

        let n = documents.len() as f64;
        let idf: Vec<f64> = terms
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows = tokenized
            .iter()
            .map(|tokens| {
                let mut row: HashMap<usize, f64> = HashMap::new();
                for token in tokens {
                    if let Some(&idx) = vocabulary.get(token.as_str()) {
                        *row.entry(idx).or_insert(0.0) += 1.0;
                    }
                }
                for (idx, value) in row.iter_mut() {
                    *value *= idf[*idx];
                }
                let norm = row.values().map(|v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    row.values_mut().for_each(|v| *v /= norm);
                }
                row
            })
            .collect();

        Ok(TfIdfMatrix {
            vocabulary,
            idf,
            rows,
        })
    }
}

impl TfIdfMatrix {
    /// Cosine similarity of two rows (rows are unit length, so a dot product).
    pub fn cosine(&self, a: usize, b: usize) -> Result<f64> {
        let (row_a, row_b) = match (self.rows.get(a), self.rows.get(b)) {
            (Some(row_a), Some(row_b)) => (row_a, row_b),
            _ => {
                return Err(ScorerError::Vectorization(format!(
                    "row index out of range: {} / {} of {}",
                    a,
                    b,
                    self.rows.len()
                )))
            }
        };

        let (small, large) = if row_a.len() <= row_b.len() {
            (row_a, row_b)
        } else {
            (row_b, row_a)
        };
        let dot: f64 = small
            .iter()
            .filter_map(|(idx, v)| large.get(idx).map(|w| v * w))
            .sum();

        Ok(match dot.partial_cmp(&0.0) {
            Some(Ordering::Greater) => dot.min(1.0),
            _ => 0.0,
        })
    }

    pub fn feature_count(&self) -> usize {
        self.vocabulary.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_documents() {
        let matrix = TfIdfVectorizer::default()
            .fit_transform(&["python sql", "python sql"])
            .unwrap();
        assert!((matrix.cosine(0, 1).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_documents() {
        let matrix = TfIdfVectorizer::default()
            .fit_transform(&["python sql", "kubernetes terraform"])
            .unwrap();
        assert_eq!(matrix.cosine(0, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_partial_overlap_matches_smoothed_idf() {
        let matrix = TfIdfVectorizer::default()
            .fit_transform(&["python sql", "python machine learning"])
            .unwrap();
        // shared term idf = 1, unique terms idf = ln(3/2) + 1
        let unique = (1.5f64).ln() + 1.0;
        let expected = 1.0 / ((1.0 + unique * unique).sqrt() * (1.0 + 2.0 * unique * unique).sqrt());
        assert!((matrix.cosine(0, 1).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_stop_words_only_is_an_error() {
        let err = TfIdfVectorizer::default()
            .fit_transform(&["the and of", "with"])
            .unwrap_err();
        assert!(matches!(err, ScorerError::Vectorization(_)));
    }

    #[test]
    fn test_max_features_caps_vocabulary() {
        let matrix = TfIdfVectorizer::new(2)
            .fit_transform(&["rust rust java", "rust python"])
            .unwrap();
        assert_eq!(matrix.feature_count(), 2);
        assert!(matrix.vocabulary.contains_key("rust"));
        assert!(matrix.vocabulary.contains_key("java"));
    }

    #[test]
    fn test_single_letter_tokens_ignored() {
        let vectorizer = TfIdfVectorizer::default();
        assert_eq!(vectorizer.tokenize("C R rust"), vec!["rust".to_string()]);
    }
}
