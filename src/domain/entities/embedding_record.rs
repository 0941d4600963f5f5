use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ContentChunk;

/// One row of the vector index: a chunk plus the vector computed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    id: Uuid,
    chunk: ContentChunk,
    model_name: String,
    embedding: Vec<f32>,
    created_at: DateTime<Utc>,
}

impl EmbeddingRecord {
    pub fn new(chunk: ContentChunk, model_name: String, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            chunk,
            model_name,
            embedding,
            created_at: Utc::now(),
        }
    }

    pub fn chunk(&self) -> &ContentChunk {
        &self.chunk
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    pub fn cosine_similarity(&self, query: &[f32]) -> Option<f32> {
        cosine_similarity(&self.embedding, query)
    }
}

/// Cosine similarity of two equal-length vectors. `None` when the lengths
/// differ or either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some(dot_product / (norm_a * norm_b))
}
