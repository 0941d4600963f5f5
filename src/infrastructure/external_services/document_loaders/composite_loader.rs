use std::sync::Arc;

use async_trait::async_trait;

use super::{ImageLoader, PdfLoader};
use crate::application::ports::{DocumentLoader, LoadError, OcrEngine};
use crate::domain::entities::{Document, LoadedSegment};
use crate::domain::value_objects::DocumentKind;

/// Dispatches each document to the loader for its kind.
pub struct CompositeDocumentLoader {
    loaders: Vec<Arc<dyn DocumentLoader>>,
}

impl CompositeDocumentLoader {
    pub fn new(ocr_engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            loaders: vec![
                Arc::new(PdfLoader::new()),
                Arc::new(ImageLoader::new(ocr_engine)),
            ],
        }
    }

    fn loader_for(&self, kind: DocumentKind) -> Option<&Arc<dyn DocumentLoader>> {
        self.loaders.iter().find(|loader| loader.can_load(kind))
    }
}

#[async_trait]
impl DocumentLoader for CompositeDocumentLoader {
    async fn load(&self, document: &Document) -> Result<Vec<LoadedSegment>, LoadError> {
        let loader = self
            .loader_for(document.kind())
            .ok_or_else(|| LoadError::UnsupportedFormat(document.kind().to_string()))?;

        loader.load(document).await
    }

    fn can_load(&self, kind: DocumentKind) -> bool {
        self.loader_for(kind).is_some()
    }
}
