use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::file_storage::{FileStorage, FileStorageError, StagedFile};

/// Stages uploads as uniquely named files under `base_path`. Each file keeps
/// the upload's extension and is deleted when its `StagedFile` is dropped.
pub struct TempFileStorage {
    base_path: PathBuf,
}

impl TempFileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub async fn ensure_directory_exists(&self) -> Result<(), FileStorageError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| FileStorageError::IoError(e.to_string()))
    }
}

fn extension_suffix(file_name: &str) -> Result<String, FileStorageError> {
    let name = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| FileStorageError::InvalidName(file_name.to_string()))?;

    Ok(match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => String::new(),
    })
}

#[async_trait]
impl FileStorage for TempFileStorage {
    async fn stage(&self, file_name: &str, data: &[u8]) -> Result<StagedFile, FileStorageError> {
        let suffix = extension_suffix(file_name)?;
        self.ensure_directory_exists().await?;

        let temp_path = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&self.base_path)
            .map_err(|e| FileStorageError::IoError(e.to_string()))?
            .into_temp_path();

        fs::write(&temp_path, data)
            .await
            .map_err(|e| FileStorageError::IoError(e.to_string()))?;

        tracing::debug!("Staged {} at {}", file_name, temp_path.display());

        Ok(StagedFile::new(temp_path.to_path_buf(), temp_path))
    }
}
