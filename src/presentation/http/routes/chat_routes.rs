use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::presentation::http::handlers::ChatHandler;

pub fn chat_routes(chat_handler: Arc<ChatHandler>) -> Router {
    Router::new()
        .route("/chat/sessions", post(ChatHandler::create_session))
        .route("/chat/sessions/{id}", get(ChatHandler::get_session))
        .route("/chat/sessions/{id}/messages", post(ChatHandler::ask_question))
        .with_state(chat_handler)
}
