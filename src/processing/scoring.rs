//! Resume / job description match scoring

use crate::config::{validate_alpha, ScoringConfig};
use crate::error::Result;
use crate::processing::skill_set::{SkillSet, SkillSetBuilder};
use crate::processing::tfidf::TfIdfVectorizer;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_ALPHA: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Weighted match score (0.0 to 100.0)
    pub final_score: f64,
    /// Job skills absent from the resume, sorted
    pub missing_skills: Vec<String>,
    /// Skills present in both documents, sorted
    pub highlighted_skills: Vec<String>,
    /// TF-IDF cosine similarity of the two skill sets (0.0 to 1.0)
    pub cosine_similarity: f64,
}

impl MatchResult {
    pub fn empty() -> Self {
        Self {
            final_score: 0.0,
            missing_skills: Vec::new(),
            highlighted_skills: Vec::new(),
            cosine_similarity: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoringOptions {
    pub max_vector_terms: usize,
    pub max_features: usize,
    pub max_detail_skills: usize,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            max_vector_terms: 500,
            max_features: 1000,
            max_detail_skills: 100,
        }
    }
}

impl From<&ScoringConfig> for ScoringOptions {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            max_vector_terms: config.max_vector_terms,
            max_features: config.max_features,
            max_detail_skills: config.max_detail_skills,
        }
    }
}

/// `(alpha * cosine + (1 - alpha) * overlap) * 100`
pub fn combine(cosine: f64, overlap_ratio: f64, alpha: f64) -> f64 {
    ((alpha * cosine + (1.0 - alpha) * overlap_ratio) * 100.0).clamp(0.0, 100.0)
}

pub struct ScoringEngine {
    builder: Arc<SkillSetBuilder>,
    options: ScoringOptions,
}

impl ScoringEngine {
    pub fn new(builder: Arc<SkillSetBuilder>) -> Self {
        Self {
            builder,
            options: ScoringOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScoringOptions) -> Self {
        self.options = options;
        self
    }

    /// Extract skills from both texts and compare them
    pub fn score(&self, resume_text: &str, job_text: &str, alpha: f64) -> Result<MatchResult> {
        validate_alpha(alpha)?;

        let resume_skills = self.builder.build(resume_text);
        let job_skills = self.builder.build(job_text);
        debug!(
            "Extracted {} resume skills, {} job skills",
            resume_skills.len(),
            job_skills.len()
        );

        self.compare(&resume_skills, &job_skills, alpha)
    }

    /// Compare two already-built skill sets
    pub fn compare(&self, resume: &SkillSet, job: &SkillSet, alpha: f64) -> Result<MatchResult> {
        validate_alpha(alpha)?;

        let resume = resume.filtered();
        let job = job.filtered();
        if resume.is_empty() || job.is_empty() {
            debug!("Empty skill set after filtering, returning zero score");
            return Ok(MatchResult::empty());
        }

        let overlap = resume.intersection(&job);
        let overlap_ratio = overlap.len() as f64 / job.len() as f64;

        let cosine = match self.vector_similarity(&resume, &job) {
            Ok(similarity) => similarity,
            Err(e) => {
                warn!("Vectorization failed, using overlap ratio as similarity: {}", e);
                overlap_ratio
            }
        };

        let limit = self.options.max_detail_skills;
        let missing_skills: Vec<String> = job
            .difference(&resume)
            .iter()
            .take(limit)
            .map(|s| s.to_string())
            .collect();
        let highlighted_skills: Vec<String> =
            overlap.iter().take(limit).map(|s| s.to_string()).collect();

        let final_score = combine(cosine, overlap_ratio, alpha);
        debug!(
            "overlap {:.3}, cosine {:.3}, final {:.2}",
            overlap_ratio, cosine, final_score
        );

        Ok(MatchResult {
            final_score,
            missing_skills,
            highlighted_skills,
            cosine_similarity: cosine,
        })
    }

    fn vector_similarity(&self, resume: &SkillSet, job: &SkillSet) -> Result<f64> {
        let resume_doc = self.join_terms(resume);
        let job_doc = self.join_terms(job);
        let matrix = TfIdfVectorizer::new(self.options.max_features)
            .fit_transform(&[resume_doc.as_str(), job_doc.as_str()])?;
        matrix.cosine(0, 1)
    }

    fn join_terms(&self, skills: &SkillSet) -> String {
        skills
            .iter()
            .take(self.options.max_vector_terms)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn builder(&self) -> &SkillSetBuilder {
        &self.builder
    }
}
