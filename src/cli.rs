//! Command-line interface for the resume scorer

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "md", "markdown"];

#[derive(Parser)]
#[command(name = "resume-scorer")]
#[command(about = "Skill-based resume and job description match scoring")]
#[command(
    long_about = "Extract skills from a resume and a job description, normalize them against a skill vocabulary, and score how well they match"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a resume against a job description
    Match {
        /// Path to resume file (PDF, DOCX, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job description file (PDF, DOCX, TXT, MD)
        #[arg(short, long)]
        job: PathBuf,

        /// Skill vocabulary CSV (overrides the configured one)
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Weight of the lexical similarity in the final score, 0 to 1
        #[arg(short, long)]
        alpha: Option<f64>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Skip tailored resume, cover letter and suggestions
        #[arg(long)]
        no_generate: bool,

        /// Include full skill sets and generated documents
        #[arg(short, long)]
        detailed: bool,
    },

    /// Print the skills found in one document
    Skills {
        /// Path to a resume or job description
        #[arg(short, long)]
        input: PathBuf,

        /// Skill vocabulary CSV (overrides the configured one)
        #[arg(long)]
        vocabulary: Option<PathBuf>,
    },

    /// Skill vocabulary commands
    Vocab {
        #[command(subcommand)]
        action: VocabAction,
    },

    /// Keyword embedding model commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum VocabAction {
    /// Show vocabulary statistics
    Info {
        /// Skill vocabulary CSV (overrides the configured one)
        #[arg(long)]
        vocabulary: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List available keyword models
    List,

    /// Download a keyword model
    Download {
        /// Model id, name or Hugging Face repo id
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if allowed_extensions.contains(&ext.to_lowercase().as_str()) => Ok(()),
        Some(ext) => Err(format!(
            "Unsupported file extension: .{}. Allowed: {}",
            ext,
            allowed_extensions.join(", ")
        )),
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_match_command() {
        let cli = Cli::try_parse_from([
            "resume-scorer",
            "match",
            "--resume",
            "cv.pdf",
            "--job",
            "job.txt",
            "--alpha",
            "0.5",
            "--no-generate",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Match {
                resume,
                alpha,
                no_generate,
                output,
                ..
            } => {
                assert_eq!(resume, PathBuf::from("cv.pdf"));
                assert_eq!(alpha, Some(0.5));
                assert!(no_generate);
                assert!(output.is_none());
            }
            _ => panic!("expected match command"),
        }
    }

    #[test]
    fn test_parse_models_download() {
        let cli = Cli::try_parse_from(["resume-scorer", "models", "download", "m2v-base"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Models {
                action: ModelAction::Download { .. }
            }
        ));
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("cv.PDF"), DOCUMENT_EXTENSIONS).is_ok());
        assert!(validate_file_extension(Path::new("cv.docx"), DOCUMENT_EXTENSIONS).is_ok());
        assert!(validate_file_extension(Path::new("cv.doc"), DOCUMENT_EXTENSIONS).is_err());
        assert!(validate_file_extension(Path::new("cv"), DOCUMENT_EXTENSIONS).is_err());
    }
}
