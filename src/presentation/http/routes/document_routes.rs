use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::DocumentHandler;

pub fn document_routes(document_handler: Arc<DocumentHandler>) -> Router {
    Router::new()
        .route("/documents", post(DocumentHandler::upload_documents))
        .route("/documents/status", get(DocumentHandler::index_status))
        .with_state(document_handler)
}
