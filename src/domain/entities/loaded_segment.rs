use serde::{Deserialize, Serialize};

use crate::domain::value_objects::SegmentMetadata;

/// Text pulled out of one document: a PDF page or a whole OCR'd image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedSegment {
    text: String,
    metadata: SegmentMetadata,
}

impl LoadedSegment {
    pub fn new(text: String, metadata: SegmentMetadata) -> Self {
        Self { text, metadata }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &SegmentMetadata {
        &self.metadata
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
