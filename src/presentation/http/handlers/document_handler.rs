use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::services::{EmbeddingIndexError, EmbeddingIndexService};
use crate::application::use_cases::{IngestDocumentsError, IngestDocumentsUseCase, UploadedFile};
use crate::presentation::http::dto::{ApiResponse, IndexStatusDto, IngestReportDto};

pub struct DocumentHandler {
    ingest_use_case: Arc<IngestDocumentsUseCase>,
    embedding_index: Arc<EmbeddingIndexService>,
}

impl DocumentHandler {
    pub fn new(
        ingest_use_case: Arc<IngestDocumentsUseCase>,
        embedding_index: Arc<EmbeddingIndexService>,
    ) -> Self {
        Self {
            ingest_use_case,
            embedding_index,
        }
    }

    pub async fn upload_documents(
        State(handler): State<Arc<DocumentHandler>>,
        mut multipart: Multipart,
    ) -> Result<impl IntoResponse, StatusCode> {
        let mut files = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?
        {
            // Plain form fields carry no document.
            let Some(file_name) = field.file_name().map(|name| name.to_string()) else {
                continue;
            };

            let content_type = field.content_type().map(|ct| ct.to_string());

            let data = field
                .bytes()
                .await
                .map_err(|_| StatusCode::BAD_REQUEST)?
                .to_vec();

            files.push(UploadedFile {
                file_name,
                content_type,
                data,
            });
        }

        if files.is_empty() {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<IngestReportDto>::error(
                    "NO_FILE_PROVIDED",
                    "No file provided in the request".to_string(),
                    None,
                )),
            ));
        }

        match handler.ingest_use_case.execute(files).await {
            Ok(report) => Ok((
                StatusCode::CREATED,
                Json(ApiResponse::success(IngestReportDto::from(report))),
            )),
            Err(e) => {
                let (status, code, details) = match &e {
                    IngestDocumentsError::EmptyBatch { failures } => (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "EMPTY_BATCH",
                        Some(
                            failures
                                .iter()
                                .map(|f| format!("{}: {}", f.file_name, f.reason))
                                .collect::<Vec<_>>()
                                .join("; "),
                        ),
                    ),
                    IngestDocumentsError::IndexingError(EmbeddingIndexError::ProviderError(_)) => {
                        (StatusCode::BAD_GATEWAY, "EMBEDDING_FAILED", None)
                    }
                    IngestDocumentsError::IndexingError(_) | IngestDocumentsError::IoError(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INGESTION_FAILED", None)
                    }
                };
                tracing::error!("Ingestion failed: {}", e);

                Ok((
                    status,
                    Json(ApiResponse::error(code, e.to_string(), details)),
                ))
            }
        }
    }

    pub async fn index_status(
        State(handler): State<Arc<DocumentHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let index_available = handler.embedding_index.is_available().await;

        match handler.embedding_index.record_count().await {
            Ok(record_count) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(IndexStatusDto {
                    index_available,
                    record_count,
                })),
            )),
            Err(e) => Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<IndexStatusDto>::error(
                    "INDEX_READ_FAILED",
                    e.to_string(),
                    None,
                )),
            )),
        }
    }
}
