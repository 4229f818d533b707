//! Match report assembled from the scoring result and generated content

use crate::llm::advisor::GeneratedContent;
use crate::processing::scoring::MatchResult;
use crate::processing::skill_set::SkillSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    /// Score rounded to two decimals
    pub match_score: f64,
    pub rating: ScoreRating,
    pub result: MatchResult,

    /// Full skill sets, present in detailed reports only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<SkillBreakdown>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<GeneratedContent>,

    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillBreakdown {
    pub resume_skills: Vec<String>,
    pub job_skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreRating {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 80.0 => ScoreRating::Excellent,
            s if s >= 60.0 => ScoreRating::Good,
            s if s >= 40.0 => ScoreRating::Fair,
            _ => ScoreRating::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreRating::Excellent => "EXCELLENT",
            ScoreRating::Good => "GOOD",
            ScoreRating::Fair => "FAIR",
            ScoreRating::Poor => "POOR",
        }
    }

    pub fn verdict(&self) -> &'static str {
        match self {
            ScoreRating::Excellent => "Strong match: the resume covers most required skills",
            ScoreRating::Good => "Good match with a few skill gaps to address",
            ScoreRating::Fair => "Partial match: several required skills are missing",
            ScoreRating::Poor => "Weak match: the resume lacks most required skills",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub scorer_version: String,
    pub resume_file: String,
    pub job_file: String,
    pub processing_time_ms: u64,
    pub keyword_model: String,
    pub vocabulary_size: usize,
    pub alpha: f64,
}

impl ReportMetadata {
    pub fn new(resume_file: &str, job_file: &str) -> Self {
        Self {
            generated_at: Utc::now(),
            scorer_version: env!("CARGO_PKG_VERSION").to_string(),
            resume_file: resume_file.to_string(),
            job_file: job_file.to_string(),
            processing_time_ms: 0,
            keyword_model: String::new(),
            vocabulary_size: 0,
            alpha: crate::processing::scoring::DEFAULT_ALPHA,
        }
    }
}

impl MatchReport {
    pub fn new(result: MatchResult, metadata: ReportMetadata) -> Self {
        let match_score = (result.final_score * 100.0).round() / 100.0;
        Self {
            match_score,
            rating: ScoreRating::from_score(match_score),
            result,
            skills: None,
            generated: None,
            metadata,
        }
    }

    pub fn with_skills(mut self, resume: &SkillSet, job: &SkillSet) -> Self {
        self.skills = Some(SkillBreakdown {
            resume_skills: resume.iter().map(str::to_string).collect(),
            job_skills: job.iter().map(str::to_string).collect(),
        });
        self
    }

    pub fn with_generated(mut self, generated: GeneratedContent) -> Self {
        self.generated = Some(generated);
        self
    }
}
