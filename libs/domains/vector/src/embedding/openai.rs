use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::EmbeddingProvider;
use crate::error::{VectorError, VectorResult};
use crate::models::{EmbeddingModel, EmbeddingResult};

/// OpenAI embedding provider configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
}

impl OpenAIConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn from_env() -> VectorResult<Self> {
        let api_key = core_config::env_required("OPENAI_API_KEY")?;
        let base_url = core_config::env_or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");

        Ok(Self { api_key, base_url })
    }
}

/// OpenAI embeddings provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
    model: EmbeddingModel,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig, model: EmbeddingModel) -> Self {
        Self {
            client: Client::new(),
            config,
            model,
        }
    }

    pub fn from_env() -> VectorResult<Self> {
        Ok(Self::new(
            OpenAIConfig::from_env()?,
            EmbeddingModel::default(),
        ))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    usage: EmbeddingUsage,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct EmbeddingUsage {
    prompt_tokens: u32,
    total_tokens: u32,
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn model(&self) -> &EmbeddingModel {
        &self.model
    }

    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> VectorResult<EmbeddingResult> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| VectorError::InvalidResponse("No embedding returned".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len(), model = self.model.model_name()))]
    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<EmbeddingResult>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(VectorError::EmptyInput);
        }

        let request = EmbeddingRequest {
            model: self.model.model_name().to_string(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Embedding provider rate limit hit");
            return Err(VectorError::RateLimited);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VectorError::Provider(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await?;

        if embedding_response.data.len() != texts.len() {
            return Err(VectorError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embedding_response.data.len()
            )));
        }

        // Sort by index to maintain input order
        let mut data = embedding_response.data;
        data.sort_by_key(|d| d.index);

        let expected = self.model.dimension();
        let tokens_per_embedding = embedding_response.usage.total_tokens / texts.len() as u32;

        data.into_iter()
            .map(|d| {
                let actual = d.embedding.len() as u64;
                if actual != expected {
                    return Err(VectorError::DimensionMismatch { expected, actual });
                }
                Ok(EmbeddingResult {
                    values: d.embedding,
                    dimension: actual,
                    tokens_used: tokens_per_embedding,
                })
            })
            .collect()
    }
}
