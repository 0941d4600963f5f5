use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{DocumentLoader, LoadError, OcrEngine};
use crate::domain::entities::{Document, LoadedSegment};
use crate::domain::value_objects::{DocumentKind, SegmentMetadata};

/// OCRs an image into a single segment holding all detected text.
pub struct ImageLoader {
    ocr_engine: Arc<dyn OcrEngine>,
}

impl ImageLoader {
    pub fn new(ocr_engine: Arc<dyn OcrEngine>) -> Self {
        Self { ocr_engine }
    }
}

#[async_trait]
impl DocumentLoader for ImageLoader {
    async fn load(&self, document: &Document) -> Result<Vec<LoadedSegment>, LoadError> {
        if document.kind() != DocumentKind::Image {
            return Err(LoadError::UnsupportedFormat(document.kind().to_string()));
        }

        let text = self
            .ocr_engine
            .recognize(document.path())
            .await
            .map_err(|e| LoadError::ExtractionFailed(e.to_string()))?;

        let mut metadata =
            SegmentMetadata::new(document.file_name().to_string(), DocumentKind::Image);
        if let Some(hash) = document.file_hash() {
            metadata.set_file_hash(hash.clone());
        }

        Ok(vec![LoadedSegment::new(text, metadata)])
    }

    fn can_load(&self, kind: DocumentKind) -> bool {
        kind == DocumentKind::Image
    }
}
