//! Text embedders used to rank keyphrase candidates

use crate::error::{Result, ScorerError};
use log::info;
use model2vec_rs::model::StaticModel;
use std::path::Path;
use std::time::Instant;
use unicode_segmentation::UnicodeSegmentation;

/// Frozen embedding model: same input, same vectors.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn name(&self) -> &str;
}

/// Model2Vec static embeddings
pub struct StaticEmbedder {
    model: StaticModel,
    model_name: String,
}

impl StaticEmbedder {
    /// Load from a local model folder or a Hugging Face repo id.
    pub fn load(repo_or_path: &Path, model_name: &str) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", repo_or_path.display());

        let model = StaticModel::from_pretrained(
            repo_or_path,
            None, // token
            Some(true), // normalize
            None, // subfolder
        )
        .map_err(|e| ScorerError::ModelLoading(format!("Failed to load model: {}", e)))?;

        info!("Model loaded successfully in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: model_name.to_string(),
        })
    }
}

impl Embedder for StaticEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self.model.encode(texts);
        if embeddings.len() != texts.len() {
            return Err(ScorerError::Embedding(format!(
                "expected {} embeddings, model returned {}",
                texts.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Model-free embedder hashing words and character trigrams into a fixed vector.
///
/// Used offline or when the static model cannot be loaded.
#[derive(Debug, Clone)]
pub struct LexicalEmbedder {
    dimensions: usize,
}

impl LexicalEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for word in text.unicode_words() {
            let word = word.to_lowercase();
            self.accumulate(&mut vector, &word, 1.0);

            let padded: Vec<char> = format!("<{}>", word).chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                self.accumulate(&mut vector, &gram, 0.5);
            }
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }

    fn accumulate(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = fnv1a(feature.as_bytes());
        let idx = (hash % self.dimensions as u64) as usize;
        let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }
}

impl Default for LexicalEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for LexicalEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn name(&self) -> &str {
        "lexical"
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

/// Cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(ScorerError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_embedder_is_deterministic() {
        let embedder = LexicalEmbedder::default();
        let texts = vec!["python developer".to_string()];
        let first = embedder.embed(&texts).unwrap();
        let second = embedder.embed(&texts).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].len(), 256);
    }

    #[test]
    fn test_lexical_similarity_prefers_shared_words() {
        let embedder = LexicalEmbedder::default();
        let texts = vec![
            "python developer with sql experience".to_string(),
            "python".to_string(),
            "gardening".to_string(),
        ];
        let vectors = embedder.embed(&texts).unwrap();
        let related = cosine_similarity(&vectors[0], &vectors[1]).unwrap();
        let unrelated = cosine_similarity(&vectors[0], &vectors[2]).unwrap();
        assert!(related > unrelated);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &b).unwrap() - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &c).unwrap().abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0, 0.0]).unwrap(), 0.0);
        assert!(cosine_similarity(&a, &[1.0]).is_err());
    }

    #[test]
    fn test_empty_text_embeds_to_zero_vector() {
        let embedder = LexicalEmbedder::new(8);
        let vectors = embedder.embed(&[String::new()]).unwrap();
        assert!(vectors[0].iter().all(|x| *x == 0.0));
    }
}
