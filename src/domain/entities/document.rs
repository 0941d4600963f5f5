use std::path::{Path, PathBuf};

use crate::domain::value_objects::{DocumentKind, FileHash};

/// A source file waiting to be loaded: either an upload staged to a temporary
/// path or a file sitting in the documents folder.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    path: PathBuf,
    file_name: String,
    kind: DocumentKind,
    file_hash: Option<FileHash>,
}

impl Document {
    pub fn new(path: PathBuf, file_name: String, kind: DocumentKind) -> Self {
        Self {
            path,
            file_name,
            kind,
            file_hash: None,
        }
    }

    /// Classifies `file_name` and builds a document, or `None` when the kind
    /// is unsupported.
    pub fn classify(
        path: PathBuf,
        file_name: String,
        content_type: Option<&str>,
    ) -> Option<Self> {
        let kind = DocumentKind::classify(&file_name, content_type)?;
        Some(Self::new(path, file_name, kind))
    }

    pub fn with_file_hash(mut self, file_hash: FileHash) -> Self {
        self.file_hash = Some(file_hash);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn file_hash(&self) -> Option<&FileHash> {
        self.file_hash.as_ref()
    }
}
