//! Document format detection

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
    Markdown,
    Unknown,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => DocumentFormat::Pdf,
            "docx" => DocumentFormat::Docx,
            "txt" | "text" => DocumentFormat::Text,
            "md" | "markdown" => DocumentFormat::Markdown,
            _ => DocumentFormat::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(DocumentFormat::Unknown, Self::from_extension)
    }
}
