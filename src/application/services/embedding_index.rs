use std::sync::Arc;

use crate::application::ports::{
    EmbeddingProvider, ProviderError,
    embedding_provider::{BatchEmbeddingRequest, EmbeddingRequest},
};
use crate::domain::entities::{ContentChunk, EmbeddingRecord};
use crate::domain::repositories::{VectorIndex, VectorIndexError};

const EMBEDDING_BATCH_SIZE: usize = 32;

#[derive(Debug)]
pub enum EmbeddingIndexError {
    ProviderError(ProviderError),
    IndexError(VectorIndexError),
    EmbeddingCountMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for EmbeddingIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingIndexError::ProviderError(e) => write!(f, "Embedding provider error: {}", e),
            EmbeddingIndexError::IndexError(e) => write!(f, "Index error: {}", e),
            EmbeddingIndexError::EmbeddingCountMismatch { expected, actual } => write!(
                f,
                "Embedding provider returned {} vectors for {} texts",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for EmbeddingIndexError {}

impl From<ProviderError> for EmbeddingIndexError {
    fn from(error: ProviderError) -> Self {
        EmbeddingIndexError::ProviderError(error)
    }
}

impl From<VectorIndexError> for EmbeddingIndexError {
    fn from(error: VectorIndexError) -> Self {
        EmbeddingIndexError::IndexError(error)
    }
}

#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk: ContentChunk,
    pub similarity_score: f32,
}

/// Embeds chunks into the persistent index and answers nearest-neighbour
/// queries against it with the same embedding provider.
pub struct EmbeddingIndexService {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_index: Arc<dyn VectorIndex>,
}

impl EmbeddingIndexService {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            embedding_provider,
            vector_index,
        }
    }

    /// Embeds and appends one record per chunk. Returns the number appended.
    /// Records from earlier calls are kept; nothing is deduplicated.
    pub async fn add_documents(
        &self,
        chunks: &[ContentChunk],
    ) -> Result<usize, EmbeddingIndexError> {
        let chunks: Vec<&ContentChunk> = chunks.iter().filter(|c| !c.is_empty()).collect();
        if chunks.is_empty() {
            return Ok(0);
        }

        let mut records = Vec::with_capacity(chunks.len());

        for chunk_batch in chunks.chunks(EMBEDDING_BATCH_SIZE) {
            let texts: Vec<String> = chunk_batch
                .iter()
                .map(|chunk| chunk.chunk_text().to_string())
                .collect();

            let response = self
                .embedding_provider
                .generate_embeddings(BatchEmbeddingRequest { texts })
                .await?;

            if response.embeddings.len() != chunk_batch.len() {
                return Err(EmbeddingIndexError::EmbeddingCountMismatch {
                    expected: chunk_batch.len(),
                    actual: response.embeddings.len(),
                });
            }

            for (chunk, embedding) in chunk_batch.iter().zip(response.embeddings) {
                records.push(EmbeddingRecord::new(
                    (*chunk).clone(),
                    response.model_name.clone(),
                    embedding,
                ));
            }
        }

        self.vector_index.append(&records).await?;

        tracing::info!(
            "Indexed {} chunks with model {}",
            records.len(),
            self.embedding_provider.model_name()
        );

        Ok(records.len())
    }

    /// The `k` most similar chunks, nearest first. Empty when no index exists
    /// yet, in which case the embedding provider is not called.
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, EmbeddingIndexError> {
        if k == 0 || !self.vector_index.exists().await {
            return Ok(Vec::new());
        }

        let response = self
            .embedding_provider
            .generate_embedding(EmbeddingRequest {
                text: query.to_string(),
            })
            .await?;

        let results = self
            .vector_index
            .similarity_search(&response.embedding, k)
            .await?;

        tracing::debug!("Retrieved {} chunks for query", results.len());

        Ok(results
            .into_iter()
            .map(|result| RetrievedChunk {
                chunk: result.record.chunk().clone(),
                similarity_score: result.similarity_score,
            })
            .collect())
    }

    pub async fn is_available(&self) -> bool {
        self.vector_index.exists().await
    }

    pub async fn record_count(&self) -> Result<usize, EmbeddingIndexError> {
        if !self.vector_index.exists().await {
            return Ok(0);
        }
        Ok(self.vector_index.count().await?)
    }
}
