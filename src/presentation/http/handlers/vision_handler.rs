use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::use_cases::{AnalyzeImageError, AnalyzeImageRequest, AnalyzeImageUseCase};
use crate::presentation::http::dto::{ApiResponse, ImageAnalysisDto};

pub struct VisionHandler {
    analyze_use_case: Arc<AnalyzeImageUseCase>,
}

impl VisionHandler {
    pub fn new(analyze_use_case: Arc<AnalyzeImageUseCase>) -> Self {
        Self { analyze_use_case }
    }

    /// Expects an `image` file field and an optional `prompt` text field.
    pub async fn analyze_image(
        State(handler): State<Arc<VisionHandler>>,
        mut multipart: Multipart,
    ) -> Result<impl IntoResponse, StatusCode> {
        let mut image = None;
        let mut prompt = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().unwrap_or("image").to_string();
                    let content_type = field.content_type().map(|ct| ct.to_string());
                    let data = field
                        .bytes()
                        .await
                        .map_err(|_| StatusCode::BAD_REQUEST)?
                        .to_vec();
                    image = Some((file_name, content_type, data));
                }
                "prompt" => {
                    prompt = Some(field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?);
                }
                _ => {}
            }
        }

        let Some((file_name, content_type, data)) = image else {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<ImageAnalysisDto>::error(
                    "NO_IMAGE_PROVIDED",
                    "No image provided in the request".to_string(),
                    None,
                )),
            ));
        };

        let request = AnalyzeImageRequest {
            file_name,
            content_type,
            data,
            prompt,
        };

        match handler.analyze_use_case.execute(request).await {
            Ok(response) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(ImageAnalysisDto::from(response))),
            )),
            Err(AnalyzeImageError::ValidationError(msg)) => Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("INVALID_IMAGE", msg, None)),
            )),
            Err(e @ AnalyzeImageError::ProviderError(_)) => {
                tracing::error!("Image analysis failed: {}", e);
                Ok((
                    StatusCode::BAD_GATEWAY,
                    Json(ApiResponse::error("VISION_FAILED", e.to_string(), None)),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ProviderError;
    use crate::presentation::http::routes::vision_routes;
    use crate::test_support::{FakeVisionModel, FormPart, multipart_request, read_response};
    use tower::ServiceExt;

    fn router(model: Arc<FakeVisionModel>) -> axum::Router {
        vision_routes(Arc::new(VisionHandler::new(Arc::new(
            AnalyzeImageUseCase::new(model),
        ))))
    }

    fn image_part(data: &[u8]) -> FormPart<'_> {
        FormPart {
            name: "image",
            file_name: Some("diagram.jpg"),
            content_type: Some("image/jpeg"),
            data,
        }
    }

    #[tokio::test]
    async fn test_analysis_with_default_prompt() {
        let model = Arc::new(FakeVisionModel::replying("A labelled cell diagram."));
        let app = router(model.clone());

        let response = app
            .oneshot(multipart_request(
                "/vision/analyze",
                &[image_part(b"jpeg bytes")],
            ))
            .await
            .unwrap();
        let (status, body) = read_response(response).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["analysis"], "A labelled cell diagram.");
        assert_eq!(body["data"]["prompt"], "Describe this image in detail.");
        assert_eq!(
            model.requests(),
            vec![(
                "Describe this image in detail.".to_string(),
                "image/jpeg".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_custom_prompt_is_forwarded() {
        let model = Arc::new(FakeVisionModel::replying("Three organelles."));
        let app = router(model.clone());

        let response = app
            .oneshot(multipart_request(
                "/vision/analyze",
                &[
                    FormPart {
                        name: "prompt",
                        file_name: None,
                        content_type: None,
                        data: b"Count the organelles.",
                    },
                    image_part(b"jpeg bytes"),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(model.requests()[0].0, "Count the organelles.");
    }

    #[tokio::test]
    async fn test_provider_failure_is_bad_gateway() {
        let model = Arc::new(FakeVisionModel::failing(ProviderError::RateLimitExceeded));

        let response = router(model)
            .oneshot(multipart_request(
                "/vision/analyze",
                &[image_part(b"jpeg bytes")],
            ))
            .await
            .unwrap();
        let (status, body) = read_response(response).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VISION_FAILED");
    }

    #[tokio::test]
    async fn test_missing_or_invalid_image() {
        let model = Arc::new(FakeVisionModel::replying("unused"));
        let app = router(model.clone());

        let response = app
            .clone()
            .oneshot(multipart_request(
                "/vision/analyze",
                &[FormPart {
                    name: "prompt",
                    file_name: None,
                    content_type: None,
                    data: b"What is this?",
                }],
            ))
            .await
            .unwrap();
        let (status, body) = read_response(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "NO_IMAGE_PROVIDED");

        let response = app
            .oneshot(multipart_request(
                "/vision/analyze",
                &[FormPart {
                    name: "image",
                    file_name: Some("notes.pdf"),
                    content_type: Some("application/pdf"),
                    data: b"%PDF-1.5",
                }],
            ))
            .await
            .unwrap();
        let (status, body) = read_response(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_IMAGE");
        assert!(model.requests().is_empty());
    }
}
