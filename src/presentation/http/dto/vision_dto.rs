use serde::Serialize;

use crate::application::use_cases::AnalyzeImageResponse;

#[derive(Debug, Serialize)]
pub struct ImageAnalysisDto {
    pub analysis: String,
    pub prompt: String,
    pub model_name: String,
}

impl From<AnalyzeImageResponse> for ImageAnalysisDto {
    fn from(response: AnalyzeImageResponse) -> Self {
        Self {
            analysis: response.analysis,
            prompt: response.prompt,
            model_name: response.model_name,
        }
    }
}
