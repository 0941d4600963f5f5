pub mod content_chunk;
pub mod conversation;
pub mod document;
pub mod embedding_record;
pub mod loaded_segment;

pub use content_chunk::ContentChunk;
pub use conversation::{ChatSession, ConversationTurn, Role};
pub use document::Document;
pub use embedding_record::EmbeddingRecord;
pub use loaded_segment::LoadedSegment;
