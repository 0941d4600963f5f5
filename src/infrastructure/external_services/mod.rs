pub mod chat_completions_client;
pub mod document_loaders;
pub mod gemini_vision_client;
pub mod http_support;
pub mod inference_client;
pub mod retry;
pub mod tavily_search_client;
pub mod tesseract_ocr;

pub use chat_completions_client::ChatCompletionsClient;
pub use gemini_vision_client::GeminiVisionClient;
pub use inference_client::{EmbeddingsClientConfig, InferenceClient, InferenceEmbeddingProvider};
pub use retry::RetryPolicy;
pub use tavily_search_client::TavilySearchClient;
pub use tesseract_ocr::TesseractOcr;
