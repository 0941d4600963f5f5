use async_trait::async_trait;

use crate::domain::entities::EmbeddingRecord;

#[derive(Debug)]
pub enum VectorIndexError {
    /// Nothing has been ingested yet, so there is nothing to search.
    NotFound(String),
    DimensionMismatch { expected: usize, actual: usize },
    StorageError(String),
    SerializationError(String),
}

impl std::fmt::Display for VectorIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorIndexError::NotFound(path) => write!(f, "Vector index not found: {}", path),
            VectorIndexError::DimensionMismatch { expected, actual } => write!(
                f,
                "Embedding dimension mismatch: index holds {}, got {}",
                expected, actual
            ),
            VectorIndexError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            VectorIndexError::SerializationError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for VectorIndexError {}

#[derive(Debug, Clone)]
pub struct SimilaritySearchResult {
    pub record: EmbeddingRecord,
    pub similarity_score: f32,
}

/// Persistent, append-only store of embedding records.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Whether an index has been created at all.
    async fn exists(&self) -> bool;

    /// Appends records. Never deduplicates.
    async fn append(&self, records: &[EmbeddingRecord]) -> Result<(), VectorIndexError>;

    /// Up to `limit` records ordered by decreasing cosine similarity.
    async fn similarity_search(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SimilaritySearchResult>, VectorIndexError>;

    async fn count(&self) -> Result<usize, VectorIndexError>;
}
