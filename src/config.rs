//! Configuration management for the resume scorer

use crate::error::{Result, ScorerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub vocabulary: VocabularyConfig,
    pub extraction: ExtractionConfig,
    pub scoring: ScoringConfig,
    pub models: ModelConfig,
    pub generation: GenerationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// CSV file holding the canonical skill strings
    pub path: PathBuf,
    /// Column to read; without a matching header the file is read as a headerless list
    pub column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub keyword_top_n: usize,
    pub max_ngram: usize,
    pub entity_chunk_size: usize,
    pub fuzzy_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the cosine similarity; the overlap ratio gets `1 - alpha`
    pub alpha: f64,
    pub max_vector_terms: usize,
    pub max_features: usize,
    pub max_detail_skills: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub keyword_model: String,
    /// Fall back to the model-free lexical embedder when the model cannot be loaded
    pub allow_lexical_fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_prompt_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

fn base_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".resume-scorer")
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            path: base_dir().join("skills.csv"),
            column: "skill".to_string(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            keyword_top_n: 20,
            max_ngram: 3,
            entity_chunk_size: 10_000,
            fuzzy_threshold: 85.0,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            max_vector_terms: 500,
            max_features: 1000,
            max_detail_skills: 100,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            models_dir: base_dir().join("models"),
            keyword_model: "potion-base-8M".to_string(),
            allow_lexical_fallback: true,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            max_prompt_chars: 4000,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ScorerError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ScorerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-scorer")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        validate_alpha(self.scoring.alpha)?;

        if !(0.0..=100.0).contains(&self.extraction.fuzzy_threshold) {
            return Err(ScorerError::Configuration(format!(
                "extraction.fuzzy_threshold must be within [0, 100], got {}",
                self.extraction.fuzzy_threshold
            )));
        }
        if self.extraction.entity_chunk_size == 0 {
            return Err(ScorerError::Configuration(
                "extraction.entity_chunk_size must be positive".to_string(),
            ));
        }
        if self.extraction.max_ngram == 0 {
            return Err(ScorerError::Configuration(
                "extraction.max_ngram must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }

    pub fn ensure_models_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.models.models_dir)?;
        Ok(())
    }
}

pub fn validate_alpha(alpha: f64) -> Result<()> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(())
    } else {
        Err(ScorerError::Configuration(format!(
            "scoring.alpha must be within [0, 1], got {}",
            alpha
        )))
    }
}
