pub mod embedding_index;
pub mod prompt_templates;
pub mod text_splitter;

pub use embedding_index::{EmbeddingIndexError, EmbeddingIndexService, RetrievedChunk};
pub use prompt_templates::{PromptTemplates, UNANSWERABLE_SENTINEL};
pub use text_splitter::{ChunkingConfigError, RecursiveCharacterSplitter, TextSplitter};
