//! Deterministic fakes for every port, shared by the unit tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{Object, Stream, dictionary};
use sha2::{Digest, Sha256};

use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingRequest, EmbeddingResponse,
};
use crate::application::ports::{
    EmbeddingProvider, ImageInput, LanguageModel, OcrEngine, OcrError, ProviderError,
    VisionModel, WebSearch, WebSearchResult, WebSearchResults,
};
use crate::domain::entities::{ContentChunk, EmbeddingRecord};
use crate::domain::repositories::{SimilaritySearchResult, VectorIndex, VectorIndexError};
use crate::domain::value_objects::{DocumentKind, SegmentMetadata};

pub fn chunk(text: &str, index: usize) -> ContentChunk {
    ContentChunk::new(
        text.to_string(),
        index,
        SegmentMetadata::new("notes.pdf".to_string(), DocumentKind::Pdf).with_page(1),
    )
}

/// Bag-of-words embedder: every lowercase token is hashed into a bucket, then
/// the vector is L2-normalised. Texts sharing words score higher.
pub struct HashingEmbeddingProvider {
    dimension: usize,
    calls: AtomicUsize,
}

impl HashingEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let bucket = u64::from_be_bytes([
                digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6],
                digest[7],
            ]) as usize
                % self.dimension;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        } else {
            vector[0] = 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EmbeddingResponse {
            embedding: self.embed(&request.text),
            model_name: self.model_name().to_string(),
        })
    }

    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(BatchEmbeddingResponse {
            embeddings: request.texts.iter().map(|t| self.embed(t)).collect(),
            model_name: self.model_name().to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "hashing-test"
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }
}

pub struct FailingEmbeddingProvider;

#[async_trait]
impl EmbeddingProvider for FailingEmbeddingProvider {
    async fn generate_embedding(
        &self,
        _request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, ProviderError> {
        Err(ProviderError::ServiceUnavailable("embeddings down".to_string()))
    }

    async fn generate_embeddings(
        &self,
        _request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, ProviderError> {
        Err(ProviderError::ServiceUnavailable("embeddings down".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing-test"
    }

    fn embedding_dimension(&self) -> usize {
        8
    }
}

#[derive(Default)]
pub struct InMemoryVectorIndex {
    records: Mutex<Vec<EmbeddingRecord>>,
    created: AtomicBool,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn exists(&self) -> bool {
        self.created.load(Ordering::SeqCst)
    }

    async fn append(&self, records: &[EmbeddingRecord]) -> Result<(), VectorIndexError> {
        self.records.lock().unwrap().extend_from_slice(records);
        self.created.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<SimilaritySearchResult>, VectorIndexError> {
        let records = self.records.lock().unwrap();
        let mut results: Vec<SimilaritySearchResult> = records
            .iter()
            .map(|record| SimilaritySearchResult {
                record: record.clone(),
                similarity_score: record.cosine_similarity(query).unwrap_or(0.0),
            })
            .collect();

        results.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        results.truncate(limit);
        Ok(results)
    }

    async fn count(&self) -> Result<usize, VectorIndexError> {
        Ok(self.len())
    }
}

/// Returns queued responses in order and records every prompt it receives.
pub struct ScriptedLanguageModel {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLanguageModel {
    pub fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(answers: &[&str]) -> Self {
        Self::new(answers.iter().map(|a| Ok(a.to_string())).collect())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedLanguageModel {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::InvalidResponse("script exhausted".to_string())))
    }

    fn model_name(&self) -> &str {
        "scripted-test"
    }
}

pub struct CountingWebSearch {
    outcome: Result<Vec<WebSearchResult>, ProviderError>,
    queries: Mutex<Vec<String>>,
}

impl CountingWebSearch {
    pub fn returning(results: Vec<WebSearchResult>) -> Self {
        Self {
            outcome: Ok(results),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            outcome: Err(error),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl WebSearch for CountingWebSearch {
    async fn search(&self, query: &str) -> Result<WebSearchResults, ProviderError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.outcome.clone().map(|results| WebSearchResults {
            query: query.to_string(),
            results,
        })
    }
}

pub struct FakeVisionModel {
    outcome: Result<String, ProviderError>,
    requests: Mutex<Vec<(String, String)>>,
}

impl FakeVisionModel {
    pub fn replying(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            outcome: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// (prompt, mime type) of every call.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionModel for FakeVisionModel {
    async fn complete_with_image(
        &self,
        prompt: &str,
        image: &ImageInput,
    ) -> Result<String, ProviderError> {
        self.requests
            .lock()
            .unwrap()
            .push((prompt.to_string(), image.mime_type.clone()));
        self.outcome.clone()
    }

    fn model_name(&self) -> &str {
        "vision-test"
    }
}

pub struct StubOcrEngine {
    text: Option<String>,
}

impl StubOcrEngine {
    pub fn reading(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }

    pub fn broken() -> Self {
        Self { text: None }
    }
}

#[async_trait]
impl OcrEngine for StubOcrEngine {
    async fn recognize(&self, image_path: &Path) -> Result<String, OcrError> {
        match &self.text {
            Some(text) => Ok(text.clone()),
            None => Err(OcrError::RecognitionFailed(format!(
                "cannot read {}",
                image_path.display()
            ))),
        }
    }
}

/// Writes a PDF with one text line per entry in `pages`.
pub fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

pub const MULTIPART_BOUNDARY: &str = "studyrag-test-boundary";

/// One `multipart/form-data` part: field name, optional file name and
/// content type, and raw bytes.
pub struct FormPart<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

pub fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[FormPart<'_>]) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        )
        .body(axum::body::Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn json_request(
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

/// Status plus the decoded `ApiResponse` envelope.
pub async fn read_response(
    response: axum::response::Response,
) -> (axum::http::StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
