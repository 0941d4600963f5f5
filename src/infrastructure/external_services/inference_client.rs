use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError};
use serde::{Deserialize, Serialize};

use super::http_support::{build_client, read_json, request_error};
use super::retry::RetryPolicy;
use crate::application::ports::ProviderError;
use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingProvider, EmbeddingRequest,
    EmbeddingResponse,
};
use crate::infrastructure::config::EmbeddingSettings;

#[derive(Serialize)]
pub struct EmbeddingsRequest {
    pub text: TextInput,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Deserialize)]
pub struct EmbeddingsResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub embeddings: Vec<Vec<f32>>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct EmbeddingsClientConfig {
    pub service_url: String,
    pub model_name: String,
    pub dimension: usize,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl EmbeddingsClientConfig {
    pub fn from_settings(settings: &EmbeddingSettings, timeout_secs: u64) -> Self {
        Self {
            service_url: settings.service_url.clone(),
            model_name: settings.model_name.clone(),
            dimension: settings.dimension,
            timeout_secs,
            retry: RetryPolicy::new(settings.max_retries, settings.backoff_factor),
        }
    }
}

/// Client for the sentence-embedding HTTP service:
/// `POST {"text": "..." | [...]}` → `{"embeddings": [[...], ...]}`.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    client: Client,
    config: EmbeddingsClientConfig,
}

impl InferenceClient {
    pub fn new(config: EmbeddingsClientConfig) -> Result<Self, ReqwestError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }

    pub async fn get_embedding(&self, text: &str) -> Result<EmbeddingsResponse, ProviderError> {
        let request = EmbeddingsRequest {
            text: TextInput::Single(text.to_string()),
        };

        self.send_request(request).await
    }

    pub async fn get_embeddings(
        &self,
        texts: &[String],
    ) -> Result<EmbeddingsResponse, ProviderError> {
        let request = EmbeddingsRequest {
            text: TextInput::Multiple(texts.to_vec()),
        };

        self.send_request(request).await
    }

    async fn send_request(
        &self,
        request: EmbeddingsRequest,
    ) -> Result<EmbeddingsResponse, ProviderError> {
        let response = self
            .config
            .retry
            .run("embedding request", || self.execute_request(&request))
            .await?;

        validate_response(response, self.config.dimension)
    }

    async fn execute_request(
        &self,
        request: &EmbeddingsRequest,
    ) -> Result<EmbeddingsResponse, ProviderError> {
        let response = self
            .client
            .post(&self.config.service_url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(request_error)?;

        read_json(response).await
    }
}

fn validate_response(
    response: EmbeddingsResponse,
    dimension: usize,
) -> Result<EmbeddingsResponse, ProviderError> {
    if !response.success {
        return Err(ProviderError::InvalidResponse(
            "Embedding service reported failure".to_string(),
        ));
    }

    if let Some(bad) = response.embeddings.iter().find(|e| e.len() != dimension) {
        return Err(ProviderError::InvalidResponse(format!(
            "Expected {}-dimensional embeddings, got {}",
            dimension,
            bad.len()
        )));
    }

    Ok(response)
}

pub struct InferenceEmbeddingProvider {
    client: InferenceClient,
}

impl InferenceEmbeddingProvider {
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmbeddingProvider for InferenceEmbeddingProvider {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, ProviderError> {
        let response = self.client.get_embedding(&request.text).await?;

        let embedding = response.embeddings.into_iter().next().ok_or_else(|| {
            ProviderError::InvalidResponse("No embeddings returned".to_string())
        })?;

        Ok(EmbeddingResponse {
            embedding,
            model_name: self.model_name().to_string(),
        })
    }

    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, ProviderError> {
        let response = self.client.get_embeddings(&request.texts).await?;

        Ok(BatchEmbeddingResponse {
            embeddings: response.embeddings,
            model_name: self.model_name().to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.client.config.model_name
    }

    fn embedding_dimension(&self) -> usize {
        self.client.config.dimension
    }
}
