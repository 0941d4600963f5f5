use std::sync::Arc;

use crate::application::ports::{ImageInput, ProviderError, VisionModel};
use crate::domain::value_objects::DocumentKind;

pub const DEFAULT_IMAGE_PROMPT: &str = "Describe this image in detail.";

#[derive(Debug)]
pub enum AnalyzeImageError {
    ValidationError(String),
    ProviderError(ProviderError),
}

impl std::fmt::Display for AnalyzeImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzeImageError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AnalyzeImageError::ProviderError(e) => write!(f, "Vision model failed: {}", e),
        }
    }
}

impl std::error::Error for AnalyzeImageError {}

impl From<ProviderError> for AnalyzeImageError {
    fn from(error: ProviderError) -> Self {
        AnalyzeImageError::ProviderError(error)
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzeImageRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnalyzeImageResponse {
    pub analysis: String,
    pub prompt: String,
    pub model_name: String,
}

pub struct AnalyzeImageUseCase {
    vision_model: Arc<dyn VisionModel>,
}

impl AnalyzeImageUseCase {
    pub fn new(vision_model: Arc<dyn VisionModel>) -> Self {
        Self { vision_model }
    }

    pub async fn execute(
        &self,
        request: AnalyzeImageRequest,
    ) -> Result<AnalyzeImageResponse, AnalyzeImageError> {
        if request.data.is_empty() {
            return Err(AnalyzeImageError::ValidationError(
                "Image data cannot be empty".to_string(),
            ));
        }

        let mime_type = image_mime_type(&request.file_name, request.content_type.as_deref())
            .ok_or_else(|| {
                AnalyzeImageError::ValidationError(format!(
                    "{} is not a PNG or JPEG image",
                    request.file_name
                ))
            })?;

        let prompt = request
            .prompt
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_PROMPT.to_string());

        let image = ImageInput::new(request.data, mime_type);
        let analysis = self
            .vision_model
            .complete_with_image(&prompt, &image)
            .await?;

        if analysis.trim().is_empty() {
            return Err(AnalyzeImageError::ProviderError(
                ProviderError::InvalidResponse("Vision model returned no text".to_string()),
            ));
        }

        tracing::info!(
            "Analyzed {} with {}",
            request.file_name,
            self.vision_model.model_name()
        );

        Ok(AnalyzeImageResponse {
            analysis,
            prompt,
            model_name: self.vision_model.model_name().to_string(),
        })
    }
}

/// A MIME type the vision provider accepts, derived from the extension first
/// and the declared content type second.
fn image_mime_type(file_name: &str, content_type: Option<&str>) -> Option<&'static str> {
    match DocumentKind::classify(file_name, content_type)? {
        DocumentKind::Image => {}
        DocumentKind::Pdf => return None,
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => Some("image/png"),
        Some("jpg") | Some("jpeg") => Some("image/jpeg"),
        _ => match content_type.map(str::to_ascii_lowercase).as_deref() {
            Some("image/png") => Some("image/png"),
            _ => Some("image/jpeg"),
        },
    }
}
