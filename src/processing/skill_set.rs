//! Per-document skill set construction

use crate::error::Result;
use crate::processing::dictionary::DictionaryMatcher;
use crate::processing::embeddings::Embedder;
use crate::processing::entities::{EntityExtractor, DEFAULT_CHUNK_SIZE};
use crate::processing::fuzzy::{FuzzyNormalizer, DEFAULT_THRESHOLD};
use crate::processing::keywords::{KeywordExtractor, DEFAULT_TOP_N};
use crate::processing::stop_words::is_stop_word;
use crate::processing::tagger::Annotator;
use crate::processing::vocabulary::{normalize_term, Vocabulary};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Normalized, deduplicated skills found in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSet(BTreeSet<String>);

impl SkillSet {
    pub fn new(skills: BTreeSet<String>) -> Self {
        Self(skills)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(skill)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    /// Drops stop words and terms of two characters or fewer
    pub fn filtered(&self) -> SkillSet {
        SkillSet(
            self.0
                .iter()
                .filter(|s| s.chars().count() > 2 && !is_stop_word(s))
                .cloned()
                .collect(),
        )
    }

    pub fn intersection(&self, other: &SkillSet) -> SkillSet {
        SkillSet(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn difference(&self, other: &SkillSet) -> SkillSet {
        SkillSet(self.0.difference(&other.0).cloned().collect())
    }

    pub fn into_inner(self) -> BTreeSet<String> {
        self.0
    }
}

impl FromIterator<String> for SkillSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        SkillSet(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone)]
pub struct BuilderOptions {
    pub keyword_top_n: usize,
    pub max_ngram: usize,
    pub chunk_size: usize,
    pub fuzzy_threshold: f64,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            keyword_top_n: DEFAULT_TOP_N,
            max_ngram: 3,
            chunk_size: DEFAULT_CHUNK_SIZE,
            fuzzy_threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Candidates gathered by each extraction method before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    pub keywords: BTreeSet<String>,
    pub entities: BTreeSet<String>,
    pub dictionary: BTreeSet<String>,
}

impl Candidates {
    /// Union of all methods, lowercased and trimmed
    pub fn merged(&self) -> BTreeSet<String> {
        self.keywords
            .iter()
            .chain(self.entities.iter())
            .chain(self.dictionary.iter())
            .map(|s| normalize_term(s))
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Runs the three extractors and funnels their union through the fuzzy normalizer.
pub struct SkillSetBuilder {
    keywords: KeywordExtractor,
    entities: EntityExtractor,
    dictionary: DictionaryMatcher,
    normalizer: FuzzyNormalizer,
    keyword_top_n: usize,
}

impl SkillSetBuilder {
    pub fn new(
        vocabulary: &Vocabulary,
        embedder: Arc<dyn Embedder>,
        annotator: Arc<dyn Annotator>,
        options: &BuilderOptions,
    ) -> Result<Self> {
        Ok(Self {
            keywords: KeywordExtractor::new(embedder).with_max_ngram(options.max_ngram),
            entities: EntityExtractor::new(annotator).with_chunk_size(options.chunk_size),
            dictionary: DictionaryMatcher::new(vocabulary)?,
            normalizer: FuzzyNormalizer::new(vocabulary).with_threshold(options.fuzzy_threshold),
            keyword_top_n: options.keyword_top_n,
        })
    }

    /// Each method runs independently; a failing method contributes nothing.
    pub fn candidates(&self, text: &str) -> Candidates {
        let keywords = self
            .keywords
            .extract(text, self.keyword_top_n)
            .map(|k| k.into_iter().collect())
            .unwrap_or_else(|e| {
                warn!("Keyword extraction failed, continuing without it: {}", e);
                BTreeSet::new()
            });

        let entities = self.entities.extract(text).unwrap_or_else(|e| {
            warn!("Entity extraction failed, continuing without it: {}", e);
            BTreeSet::new()
        });

        let dictionary = self.dictionary.extract(text).unwrap_or_else(|e| {
            warn!("Dictionary matching failed, continuing without it: {}", e);
            BTreeSet::new()
        });

        debug!(
            "Candidates: {} keyword, {} entity, {} dictionary",
            keywords.len(),
            entities.len(),
            dictionary.len()
        );

        Candidates {
            keywords,
            entities,
            dictionary,
        }
    }

    pub fn build(&self, text: &str) -> SkillSet {
        let merged = self.candidates(text).merged();
        let skills = self.normalizer.normalize(&merged);
        debug!("{} candidates normalized to {} skills", merged.len(), skills.len());
        SkillSet(skills)
    }

    pub fn keyword_model(&self) -> &str {
        self.keywords.embedder_name()
    }
}
