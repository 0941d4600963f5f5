use async_trait::async_trait;

use crate::domain::entities::{Document, LoadedSegment};
use crate::domain::value_objects::DocumentKind;

#[derive(Debug)]
pub enum LoadError {
    UnsupportedFormat(String),
    CorruptedFile(String),
    ExtractionFailed(String),
    IoError(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::UnsupportedFormat(format) => write!(f, "Unsupported format: {}", format),
            LoadError::CorruptedFile(msg) => write!(f, "Corrupted file: {}", msg),
            LoadError::ExtractionFailed(msg) => write!(f, "Extraction failed: {}", msg),
            LoadError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(error: std::io::Error) -> Self {
        LoadError::IoError(error.to_string())
    }
}

/// Turns a document on the local filesystem into text segments.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, document: &Document) -> Result<Vec<LoadedSegment>, LoadError>;

    fn can_load(&self, kind: DocumentKind) -> bool;
}
