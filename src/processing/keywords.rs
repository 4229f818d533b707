//! Keyphrase extraction ranked by embedding similarity to the whole document

use crate::error::{Result, ScorerError};
use crate::processing::embeddings::{cosine_similarity, Embedder};
use crate::processing::stop_words::is_stop_word;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

static WORD_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("Invalid word token regex"));

pub const DEFAULT_TOP_N: usize = 20;

pub struct KeywordExtractor {
    embedder: Arc<dyn Embedder>,
    max_ngram: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPhrase {
    pub phrase: String,
    pub score: f32,
}

impl KeywordExtractor {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            max_ngram: 3,
        }
    }

    pub fn with_max_ngram(mut self, max_ngram: usize) -> Self {
        self.max_ngram = max_ngram.max(1);
        self
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    /// Top `top_n` phrases, highest-scored first.
    pub fn extract(&self, text: &str, top_n: usize) -> Result<Vec<String>> {
        Ok(self
            .extract_scored(text, top_n)?
            .into_iter()
            .map(|p| p.phrase)
            .collect())
    }

    pub fn extract_scored(&self, text: &str, top_n: usize) -> Result<Vec<ScoredPhrase>> {
        let candidates = candidate_phrases(text, self.max_ngram);
        if candidates.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let document = self
            .embedder
            .embed(&[text.to_string()])?
            .pop()
            .ok_or_else(|| ScorerError::KeywordExtraction("document embedding missing".to_string()))?;

        let candidates: Vec<String> = candidates.into_iter().collect();
        let embeddings = self.embedder.embed(&candidates)?;
        if embeddings.len() != candidates.len() {
            return Err(ScorerError::KeywordExtraction(format!(
                "{} candidates but {} embeddings",
                candidates.len(),
                embeddings.len()
            )));
        }

        let mut scored = Vec::with_capacity(candidates.len());
        for (phrase, embedding) in candidates.into_iter().zip(embeddings.iter()) {
            let score = cosine_similarity(&document, embedding)?;
            scored.push(ScoredPhrase { phrase, score });
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.phrase.cmp(&b.phrase))
        });
        scored.truncate(top_n);
        Ok(scored)
    }
}

/// Distinct 1..=`max_ngram` word n-grams over the lowercase tokens with stop words removed.
pub fn candidate_phrases(text: &str, max_ngram: usize) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = WORD_TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .collect();

    let mut phrases = BTreeSet::new();
    for n in 1..=max_ngram.max(1) {
        for window in tokens.windows(n) {
            phrases.insert(window.join(" "));
        }
    }
    phrases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::embeddings::LexicalEmbedder;

    fn extractor() -> KeywordExtractor {
        KeywordExtractor::new(Arc::new(LexicalEmbedder::default()))
    }

    #[test]
    fn test_candidates_skip_stop_words() {
        let phrases = candidate_phrases("Looking for a Python and machine learning expert", 3);
        assert!(phrases.contains("python"));
        assert!(phrases.contains("machine learning"));
        assert!(phrases.contains("python machine learning"));
        assert!(!phrases.contains("for"));
        assert!(!phrases.iter().any(|p| p.split(' ').count() > 3));
    }

    #[test]
    fn test_extract_respects_top_n() {
        let text = "Senior Rust engineer building distributed storage engines and network services";
        let keywords = extractor().extract(text, 5).unwrap();
        assert_eq!(keywords.len(), 5);
    }

    #[test]
    fn test_extract_is_deterministic() {
        let text = "Python developer with SQL experience and data pipelines";
        let first = extractor().extract(text, 10).unwrap();
        let second = extractor().extract(text, 10).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scores_are_descending() {
        let scored = extractor()
            .extract_scored("kubernetes operators written in go for cloud clusters", 10)
            .unwrap();
        for pair in scored.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_empty_text() {
        assert!(extractor().extract("", 20).unwrap().is_empty());
        assert!(extractor().extract("the and of", 20).unwrap().is_empty());
    }
}
