use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::application::ports::{DocumentLoader, FileStorage};
use crate::application::services::{
    EmbeddingIndexError, EmbeddingIndexService, RecursiveCharacterSplitter,
};
use crate::domain::entities::{Document, LoadedSegment};
use crate::domain::value_objects::{DocumentKind, FileHash};

/// Serializes whole ingestion runs across every use case instance.
static INGESTION_LOCK: Mutex<()> = Mutex::const_new(());

#[derive(Debug)]
pub enum IngestDocumentsError {
    EmptyBatch { failures: Vec<IngestFailure> },
    IndexingError(EmbeddingIndexError),
    IoError(String),
}

impl std::fmt::Display for IngestDocumentsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestDocumentsError::EmptyBatch { failures } => write!(
                f,
                "No document could be loaded ({} failed)",
                failures.len()
            ),
            IngestDocumentsError::IndexingError(e) => write!(f, "Indexing failed: {}", e),
            IngestDocumentsError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for IngestDocumentsError {}

impl From<EmbeddingIndexError> for IngestDocumentsError {
    fn from(error: EmbeddingIndexError) -> Self {
        IngestDocumentsError::IndexingError(error)
    }
}

impl From<std::io::Error> for IngestDocumentsError {
    fn from(error: std::io::Error) -> Self {
        IngestDocumentsError::IoError(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestFailure {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub documents_loaded: usize,
    pub segments_loaded: usize,
    pub chunks_indexed: usize,
    pub failures: Vec<IngestFailure>,
    /// Directory entries ignored because of their extension.
    pub skipped: Vec<String>,
}

impl IngestReport {
    pub fn is_success(&self) -> bool {
        self.documents_loaded > 0
    }
}

pub struct IngestDocumentsUseCase {
    file_storage: Arc<dyn FileStorage>,
    document_loader: Arc<dyn DocumentLoader>,
    splitter: RecursiveCharacterSplitter,
    embedding_index: Arc<EmbeddingIndexService>,
}

impl IngestDocumentsUseCase {
    pub fn new(
        file_storage: Arc<dyn FileStorage>,
        document_loader: Arc<dyn DocumentLoader>,
        splitter: RecursiveCharacterSplitter,
        embedding_index: Arc<EmbeddingIndexService>,
    ) -> Self {
        Self {
            file_storage,
            document_loader,
            splitter,
            embedding_index,
        }
    }

    /// Stages, loads and indexes uploaded files in order. A file that fails
    /// is recorded in the report and the rest of the batch continues.
    pub async fn execute(
        &self,
        files: Vec<UploadedFile>,
    ) -> Result<IngestReport, IngestDocumentsError> {
        let _guard = INGESTION_LOCK.lock().await;

        let mut report = IngestReport::default();
        let mut segments = Vec::new();

        for file in files {
            match self.load_upload(&file).await {
                Ok(loaded) => {
                    tracing::info!("Loaded {} ({} segments)", file.file_name, loaded.len());
                    report.documents_loaded += 1;
                    segments.extend(loaded);
                }
                Err(reason) => {
                    tracing::warn!("Skipping {}: {}", file.file_name, reason);
                    report.failures.push(IngestFailure {
                        file_name: file.file_name,
                        reason,
                    });
                }
            }
        }

        self.index_segments(report, segments).await
    }

    /// Loads every supported file in `directory` in place, in file-name order.
    pub async fn ingest_directory(
        &self,
        directory: &Path,
    ) -> Result<IngestReport, IngestDocumentsError> {
        let _guard = INGESTION_LOCK.lock().await;

        let mut report = IngestReport::default();
        let mut segments = Vec::new();

        for (path, file_name) in list_files(directory).await? {
            let Some(document) = Document::classify(path, file_name.clone(), None) else {
                tracing::info!("Ignoring unsupported file {}", file_name);
                report.skipped.push(file_name);
                continue;
            };

            match self.document_loader.load(&document).await {
                Ok(loaded) => {
                    tracing::info!("Loaded {} ({} segments)", file_name, loaded.len());
                    report.documents_loaded += 1;
                    segments.extend(loaded);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", file_name, e);
                    report.failures.push(IngestFailure {
                        file_name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.index_segments(report, segments).await
    }

    async fn load_upload(&self, file: &UploadedFile) -> Result<Vec<LoadedSegment>, String> {
        if file.data.is_empty() {
            return Err("file is empty".to_string());
        }

        let kind = DocumentKind::classify(&file.file_name, file.content_type.as_deref())
            .ok_or_else(|| {
                format!(
                    "unsupported file type (expected {})",
                    DocumentKind::supported_extensions().join(", ")
                )
            })?;

        let staged = self
            .file_storage
            .stage(&file.file_name, &file.data)
            .await
            .map_err(|e| e.to_string())?;

        let document = Document::new(staged.path().to_path_buf(), file.file_name.clone(), kind)
            .with_file_hash(FileHash::of(&file.data));

        let segments = self
            .document_loader
            .load(&document)
            .await
            .map_err(|e| e.to_string())?;

        // `staged` drops here and removes the temporary file.
        Ok(segments)
    }

    async fn index_segments(
        &self,
        mut report: IngestReport,
        mut segments: Vec<LoadedSegment>,
    ) -> Result<IngestReport, IngestDocumentsError> {
        report.segments_loaded = segments.len();

        if report.documents_loaded == 0 {
            tracing::warn!(
                "Nothing to index: no document loaded, {} failed",
                report.failures.len()
            );
            return Err(IngestDocumentsError::EmptyBatch {
                failures: report.failures,
            });
        }

        segments.retain(|segment| !segment.is_blank());
        let chunks = self.splitter.split_segments(&segments);
        if chunks.is_empty() {
            tracing::warn!(
                "{} documents loaded but none contained text, index left unchanged",
                report.documents_loaded
            );
            return Ok(report);
        }

        tracing::info!(
            "Split {} segments into {} chunks",
            segments.len(),
            chunks.len()
        );

        report.chunks_indexed = self.embedding_index.add_documents(&chunks).await?;

        Ok(report)
    }
}

async fn list_files(directory: &Path) -> Result<Vec<(PathBuf, String)>, IngestDocumentsError> {
    let mut entries = tokio::fs::read_dir(directory).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        files.push((entry.path(), file_name));
    }

    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}
