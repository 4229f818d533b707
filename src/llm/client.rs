//! Chat-completion client for the text generation service

use crate::config::GenerationConfig;
use crate::error::{Result, ScorerError};
use crate::llm::prompts::{truncate_chars, SYSTEM_PROMPT};
use log::debug;
use serde::Deserialize;
use std::time::Duration;

pub trait TextGenerator {
    fn complete(&self, prompt: &str) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_prompt_chars: usize,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

impl OpenAiClient {
    pub fn new(api_key: String, config: &GenerationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_prompt_chars: config.max_prompt_chars,
        })
    }

    /// Reads the API key from the variable named in the config
    pub fn from_env(config: &GenerationConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ScorerError::Configuration(format!(
                "{} environment variable not set",
                config.api_key_env
            ))
        })?;
        Self::new(api_key, config)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": truncate_chars(prompt, self.max_prompt_chars)}
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature
        })
    }
}

impl TextGenerator for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("Requesting completion from {} ({} chars)", self.model, prompt.len());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScorerError::Generation(format!(
                "completion API error {}: {}",
                status, body
            )));
        }

        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ScorerError::Generation("completion returned no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_request_body_truncates_prompt() {
        let mut config = Config::default().generation;
        config.max_prompt_chars = 10;
        let client = OpenAiClient::new("key".to_string(), &config).unwrap();

        let body = client.request_body(&"x".repeat(50));
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["content"], "x".repeat(10));
    }

    #[test]
    fn test_from_env_requires_key() {
        let mut config = Config::default().generation;
        config.api_key_env = "RESUME_SCORER_TEST_UNSET_KEY".to_string();
        let err = OpenAiClient::from_env(&config).err().unwrap();
        assert!(matches!(err, ScorerError::Configuration(_)));
    }

    #[test]
    fn test_parse_completion_response() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"  Hello  "}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("  Hello  "));
    }
}
