//! Document input: format detection, text extraction and cleaning

pub mod file_detector;
pub mod manager;
pub mod text_extractor;

pub use manager::{clean_text, InputManager};
