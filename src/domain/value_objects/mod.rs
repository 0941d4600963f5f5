pub mod document_kind;
pub mod file_hash;
pub mod segment_metadata;

pub use document_kind::DocumentKind;
pub use file_hash::FileHash;
pub use segment_metadata::SegmentMetadata;
