//! resume-scorer: skill-based resume and job description match scoring

use clap::Parser;
use log::{error, info, warn};
use resume_scorer::cli::{
    self, Cli, Commands, ConfigAction, ModelAction, VocabAction, DOCUMENT_EXTENSIONS,
};
use resume_scorer::config::{validate_alpha, Config};
use resume_scorer::error::{Result, ScorerError};
use resume_scorer::input::InputManager;
use resume_scorer::llm::{CareerAdvisor, OpenAiClient};
use resume_scorer::output::formatter::parse_output_format;
use resume_scorer::output::{save_report_to_file, MatchReport, ReportGenerator, ReportMetadata};
use resume_scorer::processing::embedding_manager::KeywordModelManager;
use resume_scorer::processing::{
    ContextSettings, KeywordModel, MatchContext, Vocabulary, VocabularyStore,
};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Match {
            resume,
            job,
            vocabulary,
            alpha,
            output,
            save,
            no_generate,
            detailed,
        } => {
            let alpha = alpha.unwrap_or(config.scoring.alpha);
            validate_alpha(alpha)?;
            let format = match output {
                Some(format) => parse_output_format(&format)?,
                None => config.output.format,
            };
            let detailed = detailed || config.output.detailed;

            cli::validate_file_extension(&resume, DOCUMENT_EXTENSIONS)
                .map_err(|e| ScorerError::InvalidInput(format!("Resume file: {}", e)))?;
            cli::validate_file_extension(&job, DOCUMENT_EXTENSIONS)
                .map_err(|e| ScorerError::InvalidInput(format!("Job description file: {}", e)))?;

            let start_time = Instant::now();
            let context = build_context(&config, vocabulary).await?;
            let skill_vocabulary = context.vocabulary()?;

            let mut input_manager = InputManager::new();
            let resume_text = input_manager.load_document(&resume).await?;
            let job_text = input_manager.load_document(&job).await?;
            info!(
                "Loaded resume ({} chars) and job description ({} chars)",
                resume_text.len(),
                job_text.len()
            );

            let analysis = context.analyze(&resume_text, &job_text, alpha)?;

            let mut metadata = ReportMetadata::new(
                &resume.to_string_lossy(),
                &job.to_string_lossy(),
            );
            metadata.keyword_model = context.keyword_model_name()?;
            metadata.vocabulary_size = skill_vocabulary.len();
            metadata.alpha = alpha;

            let mut report = MatchReport::new(analysis.result.clone(), metadata);
            if detailed {
                report = report.with_skills(&analysis.resume_skills, &analysis.job_skills);
            }

            if config.generation.enabled && !no_generate {
                match OpenAiClient::from_env(&config.generation) {
                    Ok(client) => {
                        let advisor = CareerAdvisor::new(client);
                        let generated = advisor
                            .advise(&resume_text, &job_text, &analysis.result)
                            .await;
                        report = report.with_generated(generated);
                    }
                    Err(e) => warn!("Skipping generated content: {}", e),
                }
            }

            report.metadata.processing_time_ms = start_time.elapsed().as_millis() as u64;

            let generator = ReportGenerator::new(config.output.color_output && save.is_none(), detailed);
            let rendered = generator.generate_report(&report, format)?;

            match save {
                Some(path) => {
                    save_report_to_file(&rendered, &path)?;
                    println!("Report saved to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Skills { input, vocabulary } => {
            cli::validate_file_extension(&input, DOCUMENT_EXTENSIONS)
                .map_err(ScorerError::InvalidInput)?;

            let context = build_context(&config, vocabulary).await?;
            context.vocabulary()?;

            let text = InputManager::new().load_document(&input).await?;
            let skills = context.skills(&text)?;

            println!("Skills found in {} ({}):", input.display(), skills.len());
            for skill in skills.iter() {
                println!("  • {}", skill);
            }
        }

        Commands::Vocab { action } => match action {
            VocabAction::Info { vocabulary } => {
                let path = vocabulary.unwrap_or_else(|| config.vocabulary.path.clone());
                let store = VocabularyStore::new(path.clone(), config.vocabulary.column.as_str());
                let skills = store.load()?;
                print_vocabulary_info(&path, &skills);
            }
        },

        Commands::Models { action } => {
            let mut manager = KeywordModelManager::new(config.models_dir().clone())?;
            match action {
                ModelAction::List => {
                    println!("Keyword models ({}):\n", manager.models_dir().display());
                    for model in manager.list_available() {
                        let status = if manager.is_downloaded(&model.id) {
                            "downloaded"
                        } else {
                            "available"
                        };
                        let marker = if model.id == config.models.keyword_model {
                            " (configured)"
                        } else {
                            ""
                        };
                        println!(
                            "  • {}{} - {} ({} MB, {} dims) [{}]",
                            model.id, marker, model.repo_id, model.size_mb, model.dimensions, status
                        );
                        println!("    {}", model.description);
                    }
                }
                ModelAction::Download { model } => {
                    let path = manager.download(&model).await?;
                    println!("Model ready at {}", path.display());
                }
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let rendered = toml::to_string_pretty(&config).map_err(|e| {
                    ScorerError::Configuration(format!("Failed to serialize config: {}", e))
                })?;
                println!("# {}\n{}", config_path.display(), rendered);
            }
            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                println!("Configuration reset: {}", config_path.display());
            }
            Some(ConfigAction::Path) => println!("{}", config_path.display()),
        },
    }

    Ok(())
}

/// Context over the configured (or overridden) vocabulary and keyword model
async fn build_context(config: &Config, vocabulary: Option<PathBuf>) -> Result<MatchContext> {
    let vocabulary_path = vocabulary.unwrap_or_else(|| config.vocabulary.path.clone());
    let store = VocabularyStore::new(vocabulary_path, config.vocabulary.column.as_str());

    let keyword_model = match resolve_keyword_model(config).await {
        Ok(model) => model,
        Err(e) if config.models.allow_lexical_fallback => {
            warn!("Keyword model unavailable ({}), falling back to lexical embeddings", e);
            KeywordModel::Lexical
        }
        Err(e) => return Err(e),
    };

    Ok(MatchContext::new(
        store,
        ContextSettings::from_config(config, keyword_model),
    ))
}

async fn resolve_keyword_model(config: &Config) -> Result<KeywordModel> {
    if config.models.keyword_model.eq_ignore_ascii_case("lexical") {
        return Ok(KeywordModel::Lexical);
    }
    let mut manager = KeywordModelManager::new(config.models_dir().clone())?;
    let path = manager.ensure_available(&config.models.keyword_model).await?;
    Ok(KeywordModel::Static {
        path,
        name: config.models.keyword_model.clone(),
    })
}

fn print_vocabulary_info(path: &Path, vocabulary: &Vocabulary) {
    let multiword = vocabulary.multiword_entries().count();
    println!("Vocabulary: {}", path.display());
    println!("  Terms: {}", vocabulary.len());
    println!("  Multiword terms: {}", multiword);
    println!("  Single-word terms: {}", vocabulary.len() - multiword);
    let sample: Vec<&str> = vocabulary.iter().take(10).collect();
    println!("  Sample: {}", sample.join(", "));
}
