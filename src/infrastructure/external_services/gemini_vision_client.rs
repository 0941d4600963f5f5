use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http_support::{build_client, read_json, request_error, require_key};
use super::retry::RetryPolicy;
use crate::application::ports::{ImageInput, ProviderError, VisionModel};
use crate::infrastructure::config::VisionSettings;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Gemini `generateContent` with the image sent inline as base64.
pub struct GeminiVisionClient {
    client: Client,
    settings: VisionSettings,
    retry: RetryPolicy,
}

impl GeminiVisionClient {
    pub fn new(
        settings: VisionSettings,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            settings,
            retry,
        })
    }

    async fn execute_request(
        &self,
        api_key: &str,
        body: &GenerateContentRequest<'_>,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.settings.model);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(request_error)?;

        let parsed: GenerateContentResponse = read_json(response).await?;
        response_text(parsed)
    }
}

fn build_request<'a>(prompt: &'a str, image: &'a ImageInput) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![RequestContent {
            parts: vec![
                RequestPart::Text { text: prompt },
                RequestPart::InlineData {
                    inline_data: InlineData {
                        mime_type: &image.mime_type,
                        data: STANDARD.encode(&image.data),
                    },
                },
            ],
        }],
    }
}

/// Text of the first candidate only; further candidates are alternatives.
fn response_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::InvalidResponse(
            "Vision model returned no text".to_string(),
        ));
    }
    Ok(text)
}

#[async_trait]
impl VisionModel for GeminiVisionClient {
    async fn complete_with_image(
        &self,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String, ProviderError> {
        let api_key = require_key(&self.settings.api_key, "GOOGLE_API_KEY")?;
        let body = build_request(prompt, image);

        self.retry
            .run("vision request", || self.execute_request(&api_key, &body))
            .await
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}
