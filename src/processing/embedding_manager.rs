//! Download and lookup of the keyphrase embedding models

use crate::error::{Result, ScorerError};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const DEFAULT_KEYWORD_MODEL: &str = "potion-base-8M";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordModelInfo {
    pub id: String,
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub dimensions: u32,
    pub description: String,
}

/// Static embedding models the keyword extractor can rank candidates with.
pub fn known_models() -> Vec<KeywordModelInfo> {
    vec![
        KeywordModelInfo {
            id: "potion-base-8M".to_string(),
            name: "Potion Base 8M".to_string(),
            repo_id: "minishlab/potion-base-8M".to_string(),
            size_mb: 33,
            dimensions: 256,
            description: "Compact distilled embeddings, good default for keyphrases".to_string(),
        },
        KeywordModelInfo {
            id: "m2v-base".to_string(),
            name: "Model2Vec Base".to_string(),
            repo_id: "minishlab/M2V_base_output".to_string(),
            size_mb: 90,
            dimensions: 256,
            description: "Original Model2Vec base output".to_string(),
        },
        KeywordModelInfo {
            id: "m2v-large".to_string(),
            name: "Model2Vec Large".to_string(),
            repo_id: "minishlab/M2V_large_output".to_string(),
            size_mb: 250,
            dimensions: 512,
            description: "Larger Model2Vec output, slower to load".to_string(),
        },
    ]
}

/// A folder holds a usable model when it has weights and a tokenizer.
pub fn is_model_dir(path: &Path) -> bool {
    path.join("tokenizer.json").is_file() && path.join("model.safetensors").is_file()
}

/// Tracks which known models are present under `models_dir` and fetches missing ones.
pub struct KeywordModelManager {
    models_dir: PathBuf,
    available: BTreeMap<String, KeywordModelInfo>,
    downloaded: BTreeSet<String>,
}

impl KeywordModelManager {
    pub fn new(models_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&models_dir).map_err(|e| {
            ScorerError::ModelLoading(format!("Failed to create models directory: {}", e))
        })?;

        let available: BTreeMap<String, KeywordModelInfo> = known_models()
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();
        let downloaded = available
            .keys()
            .filter(|id| is_model_dir(&models_dir.join(id.as_str())))
            .cloned()
            .collect();

        Ok(Self {
            models_dir,
            available,
            downloaded,
        })
    }

    /// Accepts a model id, a repo id or a display name (case-insensitive)
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        if self.available.contains_key(input) {
            return Some(input.to_string());
        }
        let lowered = input.to_lowercase();
        self.available
            .values()
            .find(|info| info.repo_id == input || info.name.to_lowercase() == lowered)
            .map(|info| info.id.clone())
    }

    pub fn model_path(&self, model_id: &str) -> Option<PathBuf> {
        self.downloaded
            .contains(model_id)
            .then(|| self.models_dir.join(model_id))
    }

    pub fn is_downloaded(&self, model_id: &str) -> bool {
        self.downloaded.contains(model_id)
    }

    pub fn model_info(&self, model_id: &str) -> Option<&KeywordModelInfo> {
        self.available.get(model_id)
    }

    pub fn list_available(&self) -> Vec<&KeywordModelInfo> {
        self.available.values().collect()
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub async fn download(&mut self, input: &str) -> Result<PathBuf> {
        let model_id = self
            .resolve_model_id(input)
            .ok_or_else(|| ScorerError::ModelLoading(format!("Unknown keyword model: {}", input)))?;
        if let Some(path) = self.model_path(&model_id) {
            return Ok(path);
        }
        let info = self.available[&model_id].clone();

        info!("Downloading {} ({} MB) from {}", info.name, info.size_mb, info.repo_id);
        let model_dir = self.models_dir.join(&model_id);
        fs::create_dir_all(&model_dir).await?;

        let api = Api::new()
            .map_err(|e| ScorerError::Network(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.model(info.repo_id.clone());

        for file in ["model.safetensors", "tokenizer.json", "config.json"] {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await?;
                    info!("  fetched {}", file);
                }
                Err(e) if file == "config.json" => {
                    warn!("Optional file {} not found: {}", file, e);
                }
                Err(e) => {
                    return Err(ScorerError::Network(format!(
                        "Failed to download {} for {}: {}",
                        file, info.repo_id, e
                    )))
                }
            }
        }

        self.downloaded.insert(model_id);
        Ok(model_dir)
    }

    /// Local path of the model, downloading it first if needed
    pub async fn ensure_available(&mut self, input: &str) -> Result<PathBuf> {
        match self.resolve_model_id(input).and_then(|id| self.model_path(&id)) {
            Some(path) => Ok(path),
            None => self.download(input).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_manager_creation_lists_models() {
        let temp_dir = TempDir::new().unwrap();
        let manager = KeywordModelManager::new(temp_dir.path().join("models")).unwrap();
        assert_eq!(manager.list_available().len(), 3);
        assert!(!manager.is_downloaded(DEFAULT_KEYWORD_MODEL));
        assert!(manager.models_dir().exists());
    }

    #[test]
    fn test_resolve_model_id() {
        let temp_dir = TempDir::new().unwrap();
        let manager = KeywordModelManager::new(temp_dir.path().to_path_buf()).unwrap();

        assert_eq!(manager.resolve_model_id("potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(
            manager.resolve_model_id("minishlab/potion-base-8M"),
            Some("potion-base-8M".to_string())
        );
        assert_eq!(manager.resolve_model_id("model2vec large"), Some("m2v-large".to_string()));
        assert_eq!(manager.resolve_model_id("bert-base"), None);
    }

    #[test]
    fn test_detects_downloaded_model() {
        let temp_dir = TempDir::new().unwrap();
        let model_dir = temp_dir.path().join("m2v-base");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("tokenizer.json"), "{}").unwrap();
        std::fs::write(model_dir.join("model.safetensors"), "").unwrap();

        let manager = KeywordModelManager::new(temp_dir.path().to_path_buf()).unwrap();
        assert!(manager.is_downloaded("m2v-base"));
        assert_eq!(manager.model_path("m2v-base"), Some(model_dir));
        assert_eq!(manager.model_path("m2v-large"), None);
    }

    #[tokio::test]
    async fn test_ensure_available_uses_local_copy() {
        let temp_dir = TempDir::new().unwrap();
        let model_dir = temp_dir.path().join("potion-base-8M");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("tokenizer.json"), "{}").unwrap();
        std::fs::write(model_dir.join("model.safetensors"), "").unwrap();

        let mut manager = KeywordModelManager::new(temp_dir.path().to_path_buf()).unwrap();
        let path = manager.ensure_available("minishlab/potion-base-8M").await.unwrap();
        assert_eq!(path, model_dir);
    }

    #[tokio::test]
    async fn test_download_unknown_model_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = KeywordModelManager::new(temp_dir.path().to_path_buf()).unwrap();
        let err = manager.download("not-a-model").await.unwrap_err();
        assert!(matches!(err, ScorerError::ModelLoading(_)));
    }
}
