use serde::Serialize;

use crate::application::use_cases::{IngestFailure, IngestReport};

#[derive(Debug, Serialize)]
pub struct IngestReportDto {
    pub documents_loaded: usize,
    pub segments_loaded: usize,
    pub chunks_indexed: usize,
    pub failures: Vec<IngestFailureDto>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct IngestFailureDto {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct IndexStatusDto {
    pub index_available: bool,
    pub record_count: usize,
}

impl From<IngestFailure> for IngestFailureDto {
    fn from(failure: IngestFailure) -> Self {
        Self {
            file_name: failure.file_name,
            reason: failure.reason,
        }
    }
}

impl From<IngestReport> for IngestReportDto {
    fn from(report: IngestReport) -> Self {
        Self {
            documents_loaded: report.documents_loaded,
            segments_loaded: report.segments_loaded,
            chunks_indexed: report.chunks_indexed,
            failures: report.failures.into_iter().map(IngestFailureDto::from).collect(),
            skipped: report.skipped,
        }
    }
}
