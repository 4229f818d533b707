//! Generated career content built on top of a match result

use crate::llm::client::TextGenerator;
use crate::llm::prompts::{cover_letter_prompt, suggestions_prompt, tailored_resume_prompt};
use crate::processing::scoring::MatchResult;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const GENERATION_FALLBACK: &str =
    "Error generating content. Please try again with a smaller file.";

static LIST_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s*").expect("Invalid list number regex"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub tailored_resume: String,
    pub cover_letter: String,
    pub suggestions: Vec<String>,
}

/// Non-empty lines of a numbered list, numbering removed
pub fn parse_suggestions(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| LIST_NUMBER.replace(line, "").trim().to_string())
        .collect()
}

pub struct CareerAdvisor<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> CareerAdvisor<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Completion text, or the fixed fallback message when the service fails
    async fn generate(&self, task: &str, prompt: &str) -> String {
        match self.generator.complete(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to generate {}: {}", task, e);
                GENERATION_FALLBACK.to_string()
            }
        }
    }

    pub async fn tailored_resume(&self, resume: &str, job: &str) -> String {
        self.generate("tailored resume", &tailored_resume_prompt(resume, job))
            .await
    }

    pub async fn cover_letter(&self, resume: &str, job: &str) -> String {
        self.generate("cover letter", &cover_letter_prompt(resume, job))
            .await
    }

    pub async fn suggestions(&self, result: &MatchResult) -> Vec<String> {
        let prompt = suggestions_prompt(result.cosine_similarity, &result.missing_skills);
        parse_suggestions(&self.generate("suggestions", &prompt).await)
    }

    /// Runs the three generations one after another
    pub async fn advise(&self, resume: &str, job: &str, result: &MatchResult) -> GeneratedContent {
        info!("Generating tailored resume, cover letter and suggestions");
        let tailored_resume = self.tailored_resume(resume, job).await;
        let cover_letter = self.cover_letter(resume, job).await;
        let suggestions = self.suggestions(result).await;

        GeneratedContent {
            tailored_resume,
            cover_letter,
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ScorerError};
    use std::sync::Mutex;

    struct ScriptedGenerator {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl TextGenerator for ScriptedGenerator {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct OfflineGenerator;

    impl TextGenerator for OfflineGenerator {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(ScorerError::Network("connection refused".to_string()))
        }
    }

    fn result() -> MatchResult {
        MatchResult {
            final_score: 62.5,
            missing_skills: vec!["machine learning".to_string()],
            highlighted_skills: vec!["python".to_string()],
            cosine_similarity: 0.5,
        }
    }

    #[test]
    fn test_parse_suggestions_strips_numbering() {
        let parsed = parse_suggestions("1. Learn Docker\n\n2.Add metrics\n  3.   Ship it  \nKeep going");
        assert_eq!(parsed, vec!["Learn Docker", "Add metrics", "Ship it", "Keep going"]);
    }

    #[tokio::test]
    async fn test_advise_uses_match_result() {
        let generator = ScriptedGenerator {
            reply: "1. Take a machine learning course\n2. Highlight Python".to_string(),
            prompts: Mutex::new(Vec::new()),
        };
        let advisor = CareerAdvisor::new(generator);
        let content = advisor.advise("python developer", "ml engineer", &result()).await;

        assert_eq!(
            content.suggestions,
            vec!["Take a machine learning course", "Highlight Python"]
        );
        let prompts = advisor.generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[2].contains("Missing Skills: machine learning"));
        assert!(prompts[2].contains("50%"));
    }

    #[tokio::test]
    async fn test_generation_failure_uses_fallback() {
        let advisor = CareerAdvisor::new(OfflineGenerator);
        let content = advisor.advise("resume", "job", &result()).await;
        assert_eq!(content.tailored_resume, GENERATION_FALLBACK);
        assert_eq!(content.cover_letter, GENERATION_FALLBACK);
        assert_eq!(content.suggestions, vec![GENERATION_FALLBACK.to_string()]);
    }
}
