//! Error handling for the resume scorer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScorerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("DOCX extraction error: {0}")]
    DocxExtraction(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Skill vocabulary unavailable: {0}")]
    VocabularyUnavailable(String),

    #[error("Skill vocabulary is empty: {0}")]
    VocabularyEmpty(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Model loading error: {0}")]
    ModelLoading(String),

    #[error("Keyword extraction error: {0}")]
    KeywordExtraction(String),

    #[error("Entity extraction error: {0}")]
    EntityExtraction(String),

    #[error("Dictionary matching error: {0}")]
    DictionaryMatching(String),

    #[error("Vectorization error: {0}")]
    Vectorization(String),

    #[error("Text generation error: {0}")]
    Generation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

impl ScorerError {
    /// Vocabulary failures are startup conditions, not per-request errors.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScorerError::VocabularyUnavailable(_) | ScorerError::VocabularyEmpty(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScorerError>;

impl From<csv::Error> for ScorerError {
    fn from(err: csv::Error) -> Self {
        ScorerError::VocabularyUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for ScorerError {
    fn from(err: reqwest::Error) -> Self {
        ScorerError::Network(err.to_string())
    }
}
