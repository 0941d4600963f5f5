use std::process::ExitCode;

use dotenv::dotenv;

use studyrag::application::use_cases::IngestDocumentsError;
use studyrag::infrastructure::{AppConfig, AppContainer};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Ingestion failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let documents_path = config.documents_path.clone();
    let container = AppContainer::new(config).await?;

    tracing::info!("Ingesting documents from {}", documents_path.display());

    let report = match container
        .ingest_documents_use_case
        .ingest_directory(&documents_path)
        .await
    {
        Ok(report) => report,
        Err(IngestDocumentsError::EmptyBatch { failures }) => {
            for failure in &failures {
                tracing::warn!("{}: {}", failure.file_name, failure.reason);
            }
            return Err(format!(
                "No document in {} could be loaded",
                documents_path.display()
            )
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    for failure in &report.failures {
        tracing::warn!("Failed {}: {}", failure.file_name, failure.reason);
    }
    for skipped in &report.skipped {
        tracing::debug!("Skipped {}", skipped);
    }

    tracing::info!(
        "Loaded {} documents ({} segments), indexed {} chunks, {} failed, {} skipped",
        report.documents_loaded,
        report.segments_loaded,
        report.chunks_indexed,
        report.failures.len(),
        report.skipped.len()
    );
    tracing::info!(
        "Vector index now holds {} records",
        container.embedding_index.record_count().await?
    );

    Ok(())
}
