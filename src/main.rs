use dotenv::dotenv;

use studyrag::infrastructure::{AppConfig, AppContainer};
use studyrag::presentation::http::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env()?;
    let port = config.server_port;
    let max_upload_bytes = config.max_upload_bytes;

    let container = AppContainer::new(config).await?;

    if container.embedding_index.is_available().await {
        tracing::info!(
            "Vector index holds {} records",
            container.embedding_index.record_count().await?
        );
    } else {
        tracing::warn!("No vector index yet; upload documents before asking questions");
    }

    let server = HttpServer::new(
        container.document_handler.clone(),
        container.chat_handler.clone(),
        container.vision_handler.clone(),
        port,
        max_upload_bytes,
    );

    tracing::info!("Starting server on port {}", port);
    server.run().await
}
