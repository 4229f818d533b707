//! Console, JSON and Markdown rendering of match reports

use crate::config::OutputFormat;
use crate::error::{Result, ScorerError};
use crate::output::report::{MatchReport, ScoreRating};
use colored::{Color, Colorize};
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, rating: ScoreRating) -> String {
        let color = match rating {
            ScoreRating::Excellent => Color::Green,
            ScoreRating::Good => Color::BrightGreen,
            ScoreRating::Fair => Color::Yellow,
            ScoreRating::Poor => Color::Red,
        };

        if self.use_colors {
            format!("[{}]", rating.label().color(color).bold())
        } else {
            format!("[{}]", rating.label())
        }
    }

    fn format_skill_list(&self, skills: &[String], color: Color) -> String {
        if skills.is_empty() {
            return "  (none)\n".to_string();
        }
        skills
            .iter()
            .map(|s| format!("  • {}\n", self.colorize(s, color)))
            .collect()
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();
        let result = &report.result;

        output.push_str(&self.format_header("RESUME MATCH REPORT", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms
        ));

        output.push_str(&self.format_header("Score", 2));
        output.push_str(&format!(
            "Match Score: {:.2}% {}\n",
            report.match_score,
            self.format_score_badge(report.rating)
        ));
        output.push_str(&format!(
            "Verdict: {}\n",
            self.colorize(report.rating.verdict(), Color::Cyan)
        ));
        output.push_str(&format!(
            "Lexical similarity: {:.1}%\n",
            result.cosine_similarity * 100.0
        ));

        output.push_str(&self.format_header("Matched Skills", 3));
        output.push_str(&self.format_skill_list(&result.highlighted_skills, Color::Green));

        output.push_str(&self.format_header("Missing Skills", 3));
        output.push_str(&self.format_skill_list(&result.missing_skills, Color::Yellow));

        if let Some(generated) = &report.generated {
            output.push_str(&self.format_header("Suggestions", 2));
            for (i, suggestion) in generated.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }

            if self.detailed {
                output.push_str(&self.format_header("Tailored Resume", 2));
                output.push_str(&generated.tailored_resume);
                output.push('\n');
                output.push_str(&self.format_header("Cover Letter", 2));
                output.push_str(&generated.cover_letter);
                output.push('\n');
            }
        }

        if self.detailed {
            if let Some(skills) = &report.skills {
                output.push_str(&self.format_header("Extracted Skills", 2));
                output.push_str(&format!(
                    "Resume ({}): {}\n",
                    skills.resume_skills.len(),
                    skills.resume_skills.join(", ")
                ));
                output.push_str(&format!(
                    "Job ({}): {}\n",
                    skills.job_skills.len(),
                    skills.job_skills.join(", ")
                ));
            }
        }

        output.push_str(&format!(
            "\n{} resume-scorer v{} | keywords: {} | vocabulary: {} terms | alpha {:.2}\n",
            self.colorize("ℹ", Color::Blue),
            report.metadata.scorer_version,
            report.metadata.keyword_model,
            report.metadata.vocabulary_size,
            report.metadata.alpha
        ));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn skill_bullets(skills: &[String]) -> String {
        if skills.is_empty() {
            return "_None_\n".to_string();
        }
        skills.iter().map(|s| format!("- {}\n", s)).collect()
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut md = String::new();
        let result = &report.result;

        md.push_str("# Resume Match Report\n\n");
        md.push_str(&format!(
            "**Match Score:** {:.2}% ({})\n\n",
            report.match_score,
            report.rating.label()
        ));
        md.push_str(&format!("> {}\n\n", report.rating.verdict()));
        md.push_str(&format!(
            "**Lexical similarity:** {:.1}%\n\n",
            result.cosine_similarity * 100.0
        ));

        md.push_str("## Matched Skills\n\n");
        md.push_str(&Self::skill_bullets(&result.highlighted_skills));
        md.push_str("\n## Missing Skills\n\n");
        md.push_str(&Self::skill_bullets(&result.missing_skills));

        if let Some(generated) = &report.generated {
            md.push_str("\n## Suggestions\n\n");
            for (i, suggestion) in generated.suggestions.iter().enumerate() {
                md.push_str(&format!("{}. {}\n", i + 1, suggestion));
            }
            md.push_str("\n## Tailored Resume\n\n");
            md.push_str(&generated.tailored_resume);
            md.push_str("\n\n## Cover Letter\n\n");
            md.push_str(&generated.cover_letter);
            md.push('\n');
        }

        if self.include_metadata {
            let meta = &report.metadata;
            md.push_str("\n---\n\n");
            md.push_str("| Field | Value |\n|---|---|\n");
            md.push_str(&format!(
                "| Generated | {} |\n",
                meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            md.push_str(&format!("| Resume | {} |\n", meta.resume_file));
            md.push_str(&format!("| Job description | {} |\n", meta.job_file));
            md.push_str(&format!("| Keyword model | {} |\n", meta.keyword_model));
            md.push_str(&format!("| Vocabulary size | {} |\n", meta.vocabulary_size));
            md.push_str(&format!("| Processing time | {} ms |\n", meta.processing_time_ms));
        }

        Ok(md)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

/// Picks the formatter for the requested output format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ReportGenerator {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn generate_report(&self, report: &MatchReport, format: OutputFormat) -> Result<String> {
        let formatter: &dyn OutputFormatter = match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        };
        debug_assert_eq!(formatter.supports_format(), format);
        formatter.format_report(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(true, false)
    }
}

pub fn parse_output_format(format: &str) -> Result<OutputFormat> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        other => Err(ScorerError::OutputFormatting(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            other
        ))),
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    };
    format!("{}_match{}.{}", base_name, suffix, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::advisor::GeneratedContent;
    use crate::output::report::ReportMetadata;
    use crate::processing::scoring::MatchResult;
    use tempfile::TempDir;

    fn report() -> MatchReport {
        let result = MatchResult {
            final_score: 57.5,
            missing_skills: vec!["machine learning".to_string()],
            highlighted_skills: vec!["python".to_string()],
            cosine_similarity: 0.25,
        };
        MatchReport::new(result, ReportMetadata::new("resume.pdf", "job.txt"))
    }

    #[test]
    fn test_console_without_colors() {
        let output = ConsoleFormatter::new(false, false)
            .format_report(&report())
            .unwrap();
        assert!(output.contains("Match Score: 57.50% [FAIR]"));
        assert!(output.contains("  • python"));
        assert!(output.contains("  • machine learning"));
        assert!(!output.contains("Suggestions"));
    }

    #[test]
    fn test_console_lists_suggestions() {
        let report = report().with_generated(GeneratedContent {
            tailored_resume: "resume".to_string(),
            cover_letter: "letter".to_string(),
            suggestions: vec!["Learn PyTorch".to_string()],
        });
        let output = ConsoleFormatter::new(false, true).format_report(&report).unwrap();
        assert!(output.contains("1. Learn PyTorch"));
        assert!(output.contains("Cover Letter"));
    }

    #[test]
    fn test_json_round_trips_result() {
        let json = JsonFormatter::new(false).format_report(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["result"]["missing_skills"][0], "machine learning");
        assert_eq!(value["match_score"], 57.5);
    }

    #[test]
    fn test_markdown_sections() {
        let md = MarkdownFormatter::new(false).format_report(&report()).unwrap();
        assert!(md.starts_with("# Resume Match Report"));
        assert!(md.contains("## Missing Skills\n\n- machine learning\n"));
        assert!(!md.contains("| Field | Value |"));
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(parse_output_format("md").unwrap(), OutputFormat::Markdown);
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_suggest_filename_and_save() {
        assert_eq!(
            suggest_filename(OutputFormat::Json, "/tmp/jane_doe.pdf", false),
            "jane_doe_match.json"
        );

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reports").join("out.md");
        save_report_to_file("# report", &path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# report");
    }
}
