use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::entities::EmbeddingRecord;
use crate::domain::repositories::{SimilaritySearchResult, VectorIndex, VectorIndexError};

const FORMAT_VERSION: u32 = 1;
const MANIFEST_FILE: &str = "manifest.json";
const RECORDS_FILE: &str = "records.jsonl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub model_name: String,
    pub dimension: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
struct IndexState {
    manifest: Option<IndexManifest>,
    records: Arc<Vec<EmbeddingRecord>>,
    /// Size of `records.jsonl` when it was last read. A different size on disk
    /// means another process appended and the cache is stale.
    loaded_bytes: u64,
}

/// Directory-backed vector index: `manifest.json` plus one JSON record per
/// line in `records.jsonl`. Records are cached in memory and searched by
/// brute-force cosine similarity.
pub struct LocalVectorIndex {
    root: PathBuf,
    state: Mutex<IndexState>,
}

impl LocalVectorIndex {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            state: Mutex::new(IndexState::default()),
        }
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    fn records_path(&self) -> PathBuf {
        self.root.join(RECORDS_FILE)
    }

    async fn refresh(&self, state: &mut IndexState) -> Result<(), VectorIndexError> {
        if state.manifest.is_none() {
            state.manifest = self.read_manifest().await?;
        }
        if state.manifest.is_none() {
            return Ok(());
        }

        let on_disk = match fs::metadata(self.records_path()).await {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(storage_error(e)),
        };
        if on_disk == state.loaded_bytes {
            return Ok(());
        }

        let contents = match fs::read_to_string(self.records_path()).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(storage_error(e)),
        };

        let records = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str::<EmbeddingRecord>(line).map_err(|e| {
                    VectorIndexError::SerializationError(format!("record {}: {}", i + 1, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            "Loaded {} records from {}",
            records.len(),
            self.root.display()
        );

        state.records = Arc::new(records);
        state.loaded_bytes = contents.len() as u64;
        Ok(())
    }

    async fn read_manifest(&self) -> Result<Option<IndexManifest>, VectorIndexError> {
        let raw = match fs::read(self.manifest_path()).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(e)),
        };

        let manifest: IndexManifest = serde_json::from_slice(&raw)
            .map_err(|e| VectorIndexError::SerializationError(e.to_string()))?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(VectorIndexError::SerializationError(format!(
                "Unsupported index format version {}",
                manifest.format_version
            )));
        }

        Ok(Some(manifest))
    }

    /// Written to a temp file and renamed into place so a crash never leaves
    /// a half-written manifest.
    async fn write_manifest(&self, manifest: &IndexManifest) -> Result<(), VectorIndexError> {
        fs::create_dir_all(&self.root).await.map_err(storage_error)?;

        let bytes = serde_json::to_vec_pretty(manifest)
            .map_err(|e| VectorIndexError::SerializationError(e.to_string()))?;
        let tmp_path = self.root.join(format!("{}.tmp", MANIFEST_FILE));

        fs::write(&tmp_path, bytes).await.map_err(storage_error)?;
        fs::rename(&tmp_path, self.manifest_path())
            .await
            .map_err(storage_error)?;

        tracing::info!(
            "Created vector index at {} ({} dimensions, model {})",
            self.root.display(),
            manifest.dimension,
            manifest.model_name
        );
        Ok(())
    }
}

fn storage_error(error: std::io::Error) -> VectorIndexError {
    VectorIndexError::StorageError(error.to_string())
}

fn check_dimension(expected: usize, actual: usize) -> Result<(), VectorIndexError> {
    if expected != actual {
        return Err(VectorIndexError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[async_trait]
impl VectorIndex for LocalVectorIndex {
    async fn exists(&self) -> bool {
        fs::try_exists(self.manifest_path()).await.unwrap_or(false)
    }

    async fn append(&self, records: &[EmbeddingRecord]) -> Result<(), VectorIndexError> {
        let Some(first) = records.first() else {
            return Ok(());
        };

        let mut state = self.state.lock().await;
        self.refresh(&mut state).await?;

        // The whole batch is checked before a new index is created on disk.
        let expected = state
            .manifest
            .as_ref()
            .map_or(first.dimension(), |manifest| manifest.dimension);
        for record in records {
            check_dimension(expected, record.dimension())?;
        }

        let manifest = match &state.manifest {
            Some(manifest) => manifest.clone(),
            None => {
                let manifest = IndexManifest {
                    format_version: FORMAT_VERSION,
                    model_name: first.model_name().to_string(),
                    dimension: first.dimension(),
                    created_at: Utc::now(),
                };
                self.write_manifest(&manifest).await?;
                state.manifest = Some(manifest.clone());
                manifest
            }
        };

        if first.model_name() != manifest.model_name {
            tracing::warn!(
                "Appending {} embeddings to an index built with {}",
                first.model_name(),
                manifest.model_name
            );
        }

        let mut payload = String::new();
        for record in records {
            let line = serde_json::to_string(record)
                .map_err(|e| VectorIndexError::SerializationError(e.to_string()))?;
            payload.push_str(&line);
            payload.push('\n');
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.records_path())
            .await
            .map_err(storage_error)?;
        file.write_all(payload.as_bytes())
            .await
            .map_err(storage_error)?;
        file.flush().await.map_err(storage_error)?;

        Arc::make_mut(&mut state.records).extend_from_slice(records);
        state.loaded_bytes += payload.len() as u64;

        tracing::debug!(
            "Appended {} records ({} total)",
            records.len(),
            state.records.len()
        );
        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<SimilaritySearchResult>, VectorIndexError> {
        let (dimension, records) = {
            let mut state = self.state.lock().await;
            self.refresh(&mut state).await?;

            let Some(manifest) = &state.manifest else {
                return Err(VectorIndexError::NotFound(self.root.display().to_string()));
            };
            (manifest.dimension, state.records.clone())
        };

        check_dimension(dimension, query.len())?;
        if limit == 0 || records.is_empty() {
            return Ok(Vec::new());
        }

        let query = query.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut scored: Vec<(usize, f32)> = records
                .par_iter()
                .enumerate()
                .map(|(i, record)| (i, record.cosine_similarity(&query).unwrap_or(0.0)))
                .collect();

            scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
            scored.truncate(limit);

            scored
                .into_iter()
                .map(|(i, similarity_score)| SimilaritySearchResult {
                    record: records[i].clone(),
                    similarity_score,
                })
                .collect()
        })
        .await
        .map_err(|e| VectorIndexError::StorageError(e.to_string()))
    }

    async fn count(&self) -> Result<usize, VectorIndexError> {
        let mut state = self.state.lock().await;
        self.refresh(&mut state).await?;
        Ok(state.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::chunk;

    fn record(text: &str, embedding: Vec<f32>) -> EmbeddingRecord {
        EmbeddingRecord::new(chunk(text, 0), "test-model".to_string(), embedding)
    }

    #[tokio::test]
    async fn test_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalVectorIndex::new(dir.path().join("vector_index"));

        assert!(!index.exists().await);
        assert_eq!(index.count().await.unwrap(), 0);
        assert!(matches!(
            index.similarity_search(&[1.0, 0.0], 3).await,
            Err(VectorIndexError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_append_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("vector_index");

        let index = LocalVectorIndex::new(root.clone());
        index
            .append(&[record("a", vec![1.0, 0.0]), record("b", vec![0.0, 1.0])])
            .await
            .unwrap();
        index.append(&[record("c", vec![1.0, 1.0])]).await.unwrap();

        assert!(index.exists().await);
        assert!(root.join(MANIFEST_FILE).exists());

        let reopened = LocalVectorIndex::new(root.clone());
        assert_eq!(reopened.count().await.unwrap(), 3);

        let manifest: IndexManifest =
            serde_json::from_slice(&std::fs::read(root.join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(manifest.dimension, 2);
        assert_eq!(manifest.model_name, "test-model");
    }

    #[tokio::test]
    async fn test_sees_appends_from_another_instance() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("vector_index");
        let server = LocalVectorIndex::new(root.clone());
        let batch_job = LocalVectorIndex::new(root);

        batch_job.append(&[record("a", vec![1.0, 0.0])]).await.unwrap();
        assert_eq!(server.count().await.unwrap(), 1);

        batch_job.append(&[record("b", vec![0.0, 1.0])]).await.unwrap();
        assert_eq!(server.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rejects_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalVectorIndex::new(dir.path().to_path_buf());
        index.append(&[record("a", vec![1.0, 0.0, 0.0])]).await.unwrap();

        assert!(matches!(
            index.append(&[record("b", vec![1.0, 0.0])]).await,
            Err(VectorIndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(matches!(
            index.similarity_search(&[1.0], 1).await,
            Err(VectorIndexError::DimensionMismatch { .. })
        ));
        assert_eq!(index.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mixed_first_batch_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("vector_index");
        let index = LocalVectorIndex::new(root.clone());

        assert!(matches!(
            index
                .append(&[record("a", vec![1.0, 0.0]), record("b", vec![1.0, 0.0, 0.0])])
                .await,
            Err(VectorIndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert!(!index.exists().await);
        assert!(!root.join(MANIFEST_FILE).exists());

        index.append(&[record("c", vec![1.0, 0.0, 0.0])]).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unscorable_records_still_fill_results() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalVectorIndex::new(dir.path().to_path_buf());
        index
            .append(&[
                record("zero", vec![0.0, 0.0]),
                record("x", vec![1.0, 0.0]),
                record("y", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = index.similarity_search(&[1.0, 0.0], 3).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].record.chunk().chunk_text(), "x");
        // Ties at 0.0 keep insertion order.
        assert_eq!(results[1].record.chunk().chunk_text(), "zero");
        assert_eq!(results[1].similarity_score, 0.0);

        let results = index.similarity_search(&[0.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.similarity_score == 0.0));
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity_and_caps() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalVectorIndex::new(dir.path().to_path_buf());
        index
            .append(&[
                record("far", vec![0.0, 1.0]),
                record("near", vec![1.0, 0.1]),
                record("mid", vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = index.similarity_search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(
            results
                .iter()
                .map(|r| r.record.chunk().chunk_text())
                .collect::<Vec<_>>(),
            vec!["near", "mid"]
        );
        assert!(results[0].similarity_score > results[1].similarity_score);

        let all = index.similarity_search(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_corrupt_record_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let index = LocalVectorIndex::new(dir.path().to_path_buf());
        index.append(&[record("a", vec![1.0])]).await.unwrap();
        std::fs::write(dir.path().join(RECORDS_FILE), "{not json}\n").unwrap();

        let reopened = LocalVectorIndex::new(dir.path().to_path_buf());
        assert!(matches!(
            reopened.count().await,
            Err(VectorIndexError::SerializationError(_))
        ));
    }
}
