use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum FileStorageError {
    InvalidName(String),
    IoError(String),
}

impl std::fmt::Display for FileStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStorageError::InvalidName(name) => write!(f, "Invalid file name: {}", name),
            FileStorageError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for FileStorageError {}

/// An uploaded buffer written to a temporary path. The file is removed when
/// this value is dropped, whether or not loading succeeded.
pub struct StagedFile {
    path: PathBuf,
    _cleanup: Box<dyn Send + Sync>,
}

impl StagedFile {
    /// `cleanup` must delete `path` when dropped.
    pub fn new(path: PathBuf, cleanup: impl Send + Sync + 'static) -> Self {
        Self {
            path,
            _cleanup: Box::new(cleanup),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedFile").field("path", &self.path).finish()
    }
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Writes `data` to a fresh temporary file that keeps `file_name`'s
    /// extension.
    async fn stage(&self, file_name: &str, data: &[u8]) -> Result<StagedFile, FileStorageError>;
}
