//! Process-scoped matching context
//!
//! Owns the skill vocabulary and the extraction pipeline. Both are built on
//! first use, exactly once, and shared read-only by every later request.

use crate::config::Config;
use crate::error::{Result, ScorerError};
use crate::processing::embedding_manager::is_model_dir;
use crate::processing::embeddings::{Embedder, LexicalEmbedder, StaticEmbedder};
use crate::processing::scoring::{MatchResult, ScoringEngine, ScoringOptions};
use crate::processing::skill_set::{BuilderOptions, SkillSet, SkillSetBuilder};
use crate::processing::tagger::RuleTagger;
use crate::processing::vocabulary::{Vocabulary, VocabularyStore};
use log::{info, warn};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Where the keyword extractor gets its embeddings from
#[derive(Debug, Clone, PartialEq)]
pub enum KeywordModel {
    Static { path: PathBuf, name: String },
    Lexical,
}

#[derive(Debug, Clone)]
pub struct ContextSettings {
    pub keyword_model: KeywordModel,
    pub allow_lexical_fallback: bool,
    pub builder: BuilderOptions,
    pub scoring: ScoringOptions,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            keyword_model: KeywordModel::Lexical,
            allow_lexical_fallback: true,
            builder: BuilderOptions::default(),
            scoring: ScoringOptions::default(),
        }
    }
}

impl ContextSettings {
    pub fn from_config(config: &Config, keyword_model: KeywordModel) -> Self {
        Self {
            keyword_model,
            allow_lexical_fallback: config.models.allow_lexical_fallback,
            builder: BuilderOptions {
                keyword_top_n: config.extraction.keyword_top_n,
                max_ngram: config.extraction.max_ngram,
                chunk_size: config.extraction.entity_chunk_size,
                fuzzy_threshold: config.extraction.fuzzy_threshold,
            },
            scoring: ScoringOptions::from(&config.scoring),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchAnalysis {
    pub result: MatchResult,
    pub resume_skills: SkillSet,
    pub job_skills: SkillSet,
}

pub struct MatchContext {
    vocabulary: VocabularyStore,
    settings: ContextSettings,
    engine: OnceCell<ScoringEngine>,
}

impl MatchContext {
    pub fn new(vocabulary: VocabularyStore, settings: ContextSettings) -> Self {
        Self {
            vocabulary,
            settings,
            engine: OnceCell::new(),
        }
    }

    /// Context over an in-memory vocabulary
    pub fn with_vocabulary(vocabulary: Vocabulary, settings: ContextSettings) -> Self {
        Self::new(VocabularyStore::preloaded(vocabulary), settings)
    }

    pub fn vocabulary(&self) -> Result<Arc<Vocabulary>> {
        self.vocabulary.load()
    }

    pub fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.get().is_some()
    }

    /// The scoring engine, building the pipeline on first call
    pub fn engine(&self) -> Result<&ScoringEngine> {
        self.engine.get_or_try_init(|| self.build_engine())
    }

    pub fn skills(&self, text: &str) -> Result<SkillSet> {
        let engine = self.engine()?;
        Ok(engine.builder().build(text))
    }

    pub fn score(&self, resume_text: &str, job_text: &str, alpha: f64) -> Result<MatchResult> {
        Ok(self.analyze(resume_text, job_text, alpha)?.result)
    }

    /// Score plus the skill sets it was computed from
    pub fn analyze(&self, resume_text: &str, job_text: &str, alpha: f64) -> Result<MatchAnalysis> {
        let engine = self.engine().map_err(analysis_error)?;
        let resume_skills = engine.builder().build(resume_text);
        let job_skills = engine.builder().build(job_text);

        let result = engine
            .compare(&resume_skills, &job_skills, alpha)
            .map_err(analysis_error)?;

        Ok(MatchAnalysis {
            result,
            resume_skills,
            job_skills,
        })
    }

    pub fn keyword_model_name(&self) -> Result<String> {
        Ok(self.engine()?.builder().keyword_model().to_string())
    }

    fn build_engine(&self) -> Result<ScoringEngine> {
        let start_time = Instant::now();
        let vocabulary = self.vocabulary.load()?;
        let embedder = self.load_embedder()?;

        let builder = SkillSetBuilder::new(
            &vocabulary,
            embedder,
            Arc::new(RuleTagger::new()),
            &self.settings.builder,
        )?;

        info!(
            "Extraction pipeline ready in {:.2?} ({} vocabulary terms)",
            start_time.elapsed(),
            vocabulary.len()
        );
        Ok(ScoringEngine::new(Arc::new(builder)).with_options(self.settings.scoring.clone()))
    }

    fn load_static(&self, path: &Path, name: &str) -> Result<StaticEmbedder> {
        if !is_model_dir(path) {
            return Err(ScorerError::ModelLoading(format!(
                "no model files under {}",
                path.display()
            )));
        }
        StaticEmbedder::load(path, name)
    }

    fn load_embedder(&self) -> Result<Arc<dyn Embedder>> {
        match &self.settings.keyword_model {
            KeywordModel::Static { path, name } => match self.load_static(path, name) {
                Ok(embedder) => Ok(Arc::new(embedder)),
                Err(e) if self.settings.allow_lexical_fallback => {
                    warn!("Keyword model unavailable ({}), using lexical embeddings", e);
                    Ok(Arc::new(LexicalEmbedder::default()))
                }
                Err(e) => Err(e),
            },
            KeywordModel::Lexical => {
                info!("Using lexical embeddings for keyword ranking");
                Ok(Arc::new(LexicalEmbedder::default()))
            }
        }
    }
}

/// Fatal vocabulary and configuration errors pass through; the rest are analysis failures
fn analysis_error(e: ScorerError) -> ScorerError {
    match e {
        ScorerError::Configuration(_) => e,
        e if e.is_fatal() => e,
        e => ScorerError::AnalysisFailed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::TempDir;

    fn context() -> MatchContext {
        let vocabulary = Vocabulary::from_terms(["python", "sql", "machine learning"]).unwrap();
        MatchContext::with_vocabulary(vocabulary, ContextSettings::default())
    }

    #[test]
    fn test_pipeline_built_lazily_once() {
        let context = context();
        assert!(!context.is_initialized());
        let first = context.engine().unwrap() as *const ScoringEngine;
        let second = context.engine().unwrap() as *const ScoringEngine;
        assert!(context.is_initialized());
        assert_eq!(first, second);
        assert_eq!(context.keyword_model_name().unwrap(), "lexical");
    }

    #[test]
    fn test_shared_across_threads() {
        let context = Arc::new(context());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let context = Arc::clone(&context);
                thread::spawn(move || {
                    context
                        .score(
                            "Python developer with SQL experience",
                            "Looking for Python and machine learning expert",
                            0.3,
                        )
                        .unwrap()
                })
            })
            .collect();
        let results: Vec<MatchResult> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(results[0].highlighted_skills, vec!["python"]);
    }

    #[test]
    fn test_missing_vocabulary_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let store = VocabularyStore::new(temp_dir.path().join("absent.csv"), "skill");
        let context = MatchContext::new(store, ContextSettings::default());
        let err = context.score("python", "python", 0.3).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_model_falls_back_to_lexical() {
        let temp_dir = TempDir::new().unwrap();
        let settings = ContextSettings {
            keyword_model: KeywordModel::Static {
                path: temp_dir.path().join("no-model"),
                name: "potion-base-8M".to_string(),
            },
            ..ContextSettings::default()
        };
        let vocabulary = Vocabulary::from_terms(["python"]).unwrap();
        let context = MatchContext::with_vocabulary(vocabulary, settings);
        assert_eq!(context.keyword_model_name().unwrap(), "lexical");
    }

    #[test]
    fn test_pipeline_failure_surfaces_as_analysis_failed() {
        let temp_dir = TempDir::new().unwrap();
        let settings = ContextSettings {
            keyword_model: KeywordModel::Static {
                path: temp_dir.path().join("no-model"),
                name: "potion-base-8M".to_string(),
            },
            allow_lexical_fallback: false,
            ..ContextSettings::default()
        };
        let vocabulary = Vocabulary::from_terms(["python"]).unwrap();
        let context = MatchContext::with_vocabulary(vocabulary, settings);

        let err = context.analyze("python", "python", 0.3).unwrap_err();
        assert!(matches!(err, ScorerError::AnalysisFailed(msg) if msg.contains("no model files")));
        assert!(!context.is_initialized());
    }

    #[test]
    fn test_analyze_exposes_skill_sets() {
        let analysis = context()
            .analyze(
                "Python developer with SQL experience",
                "Looking for Python and machine learning expert",
                0.3,
            )
            .unwrap();
        assert!(analysis.resume_skills.contains("python"));
        assert!(analysis.resume_skills.contains("sql"));
        assert!(analysis.job_skills.contains("machine learning"));
        assert_eq!(analysis.result.missing_skills, vec!["machine learning"]);
    }

    #[test]
    fn test_invalid_alpha_keeps_configuration_error() {
        let err = context().score("python", "python", -0.1).unwrap_err();
        assert!(matches!(err, ScorerError::Configuration(_)));
    }
}
