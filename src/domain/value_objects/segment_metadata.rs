use serde::{Deserialize, Serialize};

use super::{DocumentKind, FileHash};

/// Provenance carried from a loaded segment onto every chunk cut from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetadata {
    source: String,
    kind: DocumentKind,
    page_number: Option<u32>,
    file_hash: Option<FileHash>,
}

impl SegmentMetadata {
    pub fn new(source: String, kind: DocumentKind) -> Self {
        Self {
            source,
            kind,
            page_number: None,
            file_hash: None,
        }
    }

    pub fn with_page(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    pub fn set_file_hash(&mut self, file_hash: FileHash) {
        self.file_hash = Some(file_hash);
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn page_number(&self) -> Option<u32> {
        self.page_number
    }

    pub fn file_hash(&self) -> Option<&FileHash> {
        self.file_hash.as_ref()
    }

    /// Short human-readable citation, e.g. `lecture.pdf p.3`.
    pub fn citation(&self) -> String {
        match self.page_number {
            Some(page) => format!("{} p.{}", self.source, page),
            None => self.source.clone(),
        }
    }
}
