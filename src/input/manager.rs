//! Document loading for resumes and job descriptions

use crate::error::{Result, ScorerError};
use crate::input::file_detector::DocumentFormat;
use crate::input::text_extractor::{
    DocxExtractor, MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Lowercase and collapse every whitespace run to a single space
pub fn clean_text(text: &str) -> String {
    WHITESPACE.replace_all(&text.to_lowercase(), " ").into_owned()
}

pub struct InputManager {
    cache: HashMap<String, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let key = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached) = self.cache.get(&key) {
                debug!("Using cached text for: {}", path.display());
                return Ok(cached.clone());
            }
        }

        if !path.exists() {
            return Err(ScorerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let text = match DocumentFormat::from_path(path) {
            DocumentFormat::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            DocumentFormat::Docx => {
                info!("Extracting text from DOCX: {}", path.display());
                DocxExtractor.extract(path).await?
            }
            DocumentFormat::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            DocumentFormat::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            DocumentFormat::Unknown => {
                return Err(ScorerError::UnsupportedFormat(format!(
                    "Unsupported file type for: {} (expected .pdf, .docx, .txt or .md)",
                    path.display()
                )));
            }
        };

        if text.trim().is_empty() {
            warn!("No text extracted from {}", path.display());
        }

        if self.enable_cache {
            self.cache.insert(key, text.clone());
        }

        Ok(text)
    }

    /// Extract and clean in one step
    pub async fn load_document(&mut self, path: &Path) -> Result<String> {
        let raw = self.extract_text(path).await?;
        Ok(clean_text(&raw))
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Senior\tRust\n\nEngineer "), " senior rust engineer ");
        assert_eq!(clean_text(""), "");
    }

    #[tokio::test]
    async fn test_load_document_cleans() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("job.txt");
        std::fs::write(&path, "Python\n\nMachine   Learning").unwrap();

        let mut manager = InputManager::new().with_cache(false);
        let text = manager.load_document(&path).await.unwrap();
        assert_eq!(text, "python machine learning");
        assert_eq!(manager.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_unknown_extension_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("resume.doc");
        std::fs::write(&path, "binary").unwrap();

        let err = InputManager::new().extract_text(&path).await.unwrap_err();
        assert!(matches!(err, ScorerError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_corrupt_docx_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("resume.docx");
        std::fs::write(&path, "not a zip archive").unwrap();

        let err = InputManager::new().extract_text(&path).await.unwrap_err();
        assert!(matches!(err, ScorerError::DocxExtraction(_)));
    }
}
