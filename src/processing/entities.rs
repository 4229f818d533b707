//! Noun and named-entity candidate extraction over fixed-size windows
//!
//! Long inputs are split into independent windows and the results unioned.
//! A name that straddles a window boundary can be lost; that approximation
//! bounds the work done per annotator call.

use crate::error::Result;
use crate::processing::stop_words::is_stop_word;
use crate::processing::tagger::{Annotator, EntityLabel, PartOfSpeech};
use log::debug;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

pub struct EntityExtractor {
    annotator: Arc<dyn Annotator>,
    chunk_size: usize,
}

impl EntityExtractor {
    pub fn new(annotator: Arc<dyn Annotator>) -> Self {
        Self {
            annotator,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn extract(&self, text: &str) -> Result<BTreeSet<String>> {
        let mut candidates = BTreeSet::new();

        let chunks = if text.chars().count() > self.chunk_size {
            partition(text, self.chunk_size)
        } else {
            vec![text]
        };
        debug!("Entity extraction over {} chunk(s)", chunks.len());

        for chunk in chunks {
            self.extract_chunk(chunk, &mut candidates)?;
        }

        Ok(candidates)
    }

    fn extract_chunk(&self, chunk: &str, candidates: &mut BTreeSet<String>) -> Result<()> {
        let annotation = self.annotator.annotate(chunk)?;

        for token in &annotation.tokens {
            if !matches!(token.pos, PartOfSpeech::Noun | PartOfSpeech::ProperNoun) {
                continue;
            }
            let word = token.text.trim();
            if word.chars().count() <= 2 || is_stop_word(word) {
                continue;
            }
            if keeps_token(word) {
                candidates.insert(word.to_string());
            }
        }

        for entity in &annotation.entities {
            if matches!(
                entity.label,
                EntityLabel::Organization | EntityLabel::Product | EntityLabel::Language
            ) {
                candidates.insert(entity.text.to_lowercase());
            }
        }

        Ok(())
    }
}

/// Capitalized, or carries a character that can appear in a skill name
fn keeps_token(word: &str) -> bool {
    let starts_upper = word.chars().next().map_or(false, |c| c.is_uppercase());
    starts_upper
        || word
            .chars()
            .any(|c| c.is_ascii_alphanumeric() || c == '+' || c == '#')
}

/// Split `text` into consecutive windows of at most `chunk_size` characters.
pub fn partition(text: &str, chunk_size: usize) -> Vec<&str> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == chunk_size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}
