use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{OcrEngine, OcrError};
use crate::infrastructure::config::OcrSettings;

/// Runs the `tesseract` executable and reads the recognised text from stdout.
pub struct TesseractOcr {
    settings: OcrSettings,
}

impl TesseractOcr {
    pub fn new(settings: OcrSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.settings.command)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.settings.language])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                OcrError::EngineUnavailable(format!("{}: {}", self.settings.command, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::RecognitionFailed(format!(
                "{} exited with {}: {}",
                self.settings.command,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::debug!(
            "OCR read {} characters from {}",
            text.chars().count(),
            image_path.display()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_executable_is_engine_unavailable() {
        let ocr = TesseractOcr::new(OcrSettings {
            command: "definitely-not-tesseract-binary".to_string(),
            language: "eng".to_string(),
        });

        let result = ocr.recognize(Path::new("scan.png")).await;

        assert!(matches!(result, Err(OcrError::EngineUnavailable(_))));
    }
}
