//! Substring scan for multiword vocabulary entries

use crate::error::{Result, ScorerError};
use crate::processing::vocabulary::Vocabulary;
use aho_corasick::{AhoCorasick, MatchKind};
use std::collections::BTreeSet;

/// Finds multiword skills ("machine learning") appearing verbatim in a text.
///
/// Single-word entries are left to the keyword and entity extractors; plain
/// substring matching on them ("go", "r") produces too many false hits.
pub struct DictionaryMatcher {
    matcher: Option<AhoCorasick>,
    patterns: Vec<String>,
}

impl DictionaryMatcher {
    pub fn new(vocabulary: &Vocabulary) -> Result<Self> {
        let patterns: Vec<String> = vocabulary
            .multiword_entries()
            .map(|s| s.to_string())
            .collect();

        if patterns.is_empty() {
            return Ok(Self {
                matcher: None,
                patterns,
            });
        }

        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&patterns)
            .map_err(|e| {
                ScorerError::DictionaryMatching(format!("Failed to build dictionary matcher: {}", e))
            })?;

        Ok(Self {
            matcher: Some(matcher),
            patterns,
        })
    }

    /// Every multiword entry contained in the lowercased text.
    pub fn extract(&self, text: &str) -> Result<BTreeSet<String>> {
        let mut found = BTreeSet::new();
        let Some(matcher) = &self.matcher else {
            return Ok(found);
        };

        let lowered = text.to_lowercase();
        let matches = matcher.try_find_overlapping_iter(&lowered).map_err(|e| {
            ScorerError::DictionaryMatching(format!("Dictionary scan failed: {}", e))
        })?;
        for mat in matches {
            found.insert(self.patterns[mat.pattern().as_usize()].clone());
        }
        Ok(found)
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}
