//! Fuzzy normalization of candidate terms onto the skill vocabulary

use crate::processing::vocabulary::Vocabulary;
use std::collections::BTreeSet;
use strsim::levenshtein;

pub const DEFAULT_THRESHOLD: f64 = 85.0;

/// Tokens lowercased, sorted and re-joined with single spaces.
pub fn token_sort_key(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut tokens: Vec<&str> = lowered.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Normalized Levenshtein similarity in [0, 100]
pub fn ratio(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100.0;
    }
    let distance = levenshtein(a, b).min(max_len);
    (max_len - distance) as f64 * 100.0 / max_len as f64
}

/// Token-order-insensitive similarity in [0, 100]
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&token_sort_key(a), &token_sort_key(b))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch<'a> {
    pub term: &'a str,
    pub score: f64,
}

/// Best-match lookup over the vocabulary.
pub trait SimilarityIndex: Send + Sync {
    /// Highest-scoring entry with score >= `min_score`. Equal scores resolve to
    /// the lexicographically smallest entry.
    fn best_match(&self, query: &str, min_score: f64) -> Option<SimilarityMatch<'_>>;
}

struct IndexedTerm {
    term: String,
    key: String,
    key_len: usize,
}

/// Linear scan with a length bound: `distance >= |len(a) - len(b)|` caps the
/// achievable score, so most entries are skipped without computing a distance.
pub struct LinearIndex {
    entries: Vec<IndexedTerm>,
    exact: BTreeSet<String>,
}

impl LinearIndex {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        let entries = vocabulary
            .iter()
            .map(|term| {
                let key = token_sort_key(term);
                IndexedTerm {
                    term: term.to_string(),
                    key_len: key.chars().count(),
                    key,
                }
            })
            .collect();
        let exact = vocabulary.iter().map(|s| s.to_string()).collect();

        Self { entries, exact }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SimilarityIndex for LinearIndex {
    fn best_match(&self, query: &str, min_score: f64) -> Option<SimilarityMatch<'_>> {
        if let Some(term) = self.exact.get(query) {
            return Some(SimilarityMatch {
                term: term.as_str(),
                score: 100.0,
            });
        }

        let query_key = token_sort_key(query);
        let query_len = query_key.chars().count();
        let mut best: Option<SimilarityMatch<'_>> = None;

        for entry in &self.entries {
            let max_len = query_len.max(entry.key_len);
            if max_len > 0 {
                let min_distance = query_len.abs_diff(entry.key_len);
                let bound = (max_len - min_distance) as f64 * 100.0 / max_len as f64;
                if bound < min_score {
                    continue;
                }
                if let Some(current) = &best {
                    if bound <= current.score {
                        continue;
                    }
                }
            }

            let score = ratio(&query_key, &entry.key);
            if score < min_score {
                continue;
            }
            // Entries are visited in lexicographic order; only a strictly better score replaces.
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(SimilarityMatch {
                    term: entry.term.as_str(),
                    score,
                });
            }
        }

        best
    }
}

/// Maps candidates onto vocabulary entries, discarding anything below the threshold.
pub struct FuzzyNormalizer<I: SimilarityIndex = LinearIndex> {
    index: I,
    threshold: f64,
}

impl FuzzyNormalizer<LinearIndex> {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        Self::with_index(LinearIndex::new(vocabulary))
    }
}

impl<I: SimilarityIndex> FuzzyNormalizer<I> {
    pub fn with_index(index: I) -> Self {
        Self {
            index,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 100.0);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Best vocabulary entry for one candidate, if it clears the threshold
    pub fn normalize_one(&self, candidate: &str) -> Option<String> {
        self.index
            .best_match(candidate, self.threshold)
            .map(|m| m.term.to_string())
    }

    pub fn normalize<'a, C>(&self, candidates: C) -> BTreeSet<String>
    where
        C: IntoIterator<Item = &'a String>,
    {
        candidates
            .into_iter()
            .filter_map(|c| self.normalize_one(c))
            .collect()
    }
}
