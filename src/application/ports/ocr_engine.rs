use async_trait::async_trait;
use std::path::Path;

#[derive(Debug)]
pub enum OcrError {
    EngineUnavailable(String),
    RecognitionFailed(String),
}

impl std::fmt::Display for OcrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrError::EngineUnavailable(msg) => write!(f, "OCR engine unavailable: {}", msg),
            OcrError::RecognitionFailed(msg) => write!(f, "OCR failed: {}", msg),
        }
    }
}

impl std::error::Error for OcrError {}

/// Extracts all text detected in an image file.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image_path: &Path) -> Result<String, OcrError>;
}
