pub mod document_loader;
pub mod embedding_provider;
pub mod file_storage;
pub mod language_model;
pub mod ocr_engine;
pub mod provider_error;
pub mod vision_model;
pub mod web_search;

pub use document_loader::{DocumentLoader, LoadError};
pub use embedding_provider::EmbeddingProvider;
pub use file_storage::{FileStorage, FileStorageError, StagedFile};
pub use language_model::LanguageModel;
pub use ocr_engine::{OcrEngine, OcrError};
pub use provider_error::ProviderError;
pub use vision_model::{ImageInput, VisionModel};
pub use web_search::{WebSearch, WebSearchResult, WebSearchResults};
