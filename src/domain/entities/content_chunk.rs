use serde::{Deserialize, Serialize};

use crate::domain::value_objects::SegmentMetadata;

/// Bounded slice of segment text; the unit that gets embedded and retrieved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentChunk {
    chunk_text: String,
    chunk_index: usize,
    metadata: SegmentMetadata,
}

impl ContentChunk {
    pub fn new(chunk_text: String, chunk_index: usize, metadata: SegmentMetadata) -> Self {
        Self {
            chunk_text,
            chunk_index,
            metadata,
        }
    }

    pub fn chunk_text(&self) -> &str {
        &self.chunk_text
    }

    /// Position of this chunk within the batch it was cut from.
    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    pub fn metadata(&self) -> &SegmentMetadata {
        &self.metadata
    }

    pub fn source(&self) -> &str {
        self.metadata.source()
    }

    pub fn page_number(&self) -> Option<u32> {
        self.metadata.page_number()
    }

    pub fn is_empty(&self) -> bool {
        self.chunk_text.trim().is_empty()
    }
}
