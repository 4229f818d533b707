//! Skill extraction and match scoring

pub mod context;
pub mod dictionary;
pub mod embedding_manager;
pub mod embeddings;
pub mod entities;
pub mod fuzzy;
pub mod keywords;
pub mod scoring;
pub mod skill_set;
pub mod stop_words;
pub mod tagger;
pub mod tfidf;
pub mod vocabulary;

pub use context::{ContextSettings, KeywordModel, MatchAnalysis, MatchContext};
pub use scoring::{MatchResult, ScoringEngine};
pub use skill_set::{SkillSet, SkillSetBuilder};
pub use vocabulary::{Vocabulary, VocabularyStore};
