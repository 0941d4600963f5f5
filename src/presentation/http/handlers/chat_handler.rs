use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::services::EmbeddingIndexError;
use crate::application::use_cases::{AnswerQuestionError, AnswerQuestionUseCase};
use crate::presentation::http::dto::{
    AnswerResponseDto, ApiResponse, AskQuestionDto, ChatSessionDto,
};
use crate::presentation::http::session_store::SessionStore;

pub struct ChatHandler {
    answer_use_case: Arc<AnswerQuestionUseCase>,
    sessions: Arc<SessionStore>,
}

impl ChatHandler {
    pub fn new(answer_use_case: Arc<AnswerQuestionUseCase>, sessions: Arc<SessionStore>) -> Self {
        Self {
            answer_use_case,
            sessions,
        }
    }

    pub async fn create_session(
        State(handler): State<Arc<ChatHandler>>,
    ) -> Result<impl IntoResponse, StatusCode> {
        let session = handler.sessions.create().await;
        Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(ChatSessionDto::from(&session))),
        ))
    }

    pub async fn get_session(
        State(handler): State<Arc<ChatHandler>>,
        Path(session_id): Path<Uuid>,
    ) -> Result<impl IntoResponse, StatusCode> {
        match handler.sessions.get(session_id).await {
            Some(session) => Ok((
                StatusCode::OK,
                Json(ApiResponse::success(ChatSessionDto::from(&session))),
            )),
            None => Ok((StatusCode::NOT_FOUND, Json(session_not_found(session_id)))),
        }
    }

    /// Answers a question and records the exchange. A failed answer leaves
    /// the transcript untouched.
    pub async fn ask_question(
        State(handler): State<Arc<ChatHandler>>,
        Path(session_id): Path<Uuid>,
        Json(request): Json<AskQuestionDto>,
    ) -> Result<impl IntoResponse, StatusCode> {
        if !handler.sessions.contains(session_id).await {
            return Ok((StatusCode::NOT_FOUND, Json(session_not_found(session_id))));
        }

        let question = request.question.trim().to_string();

        match handler.answer_use_case.execute(&question).await {
            Ok(response) => {
                let recorded = handler
                    .sessions
                    .record_exchange(session_id, question.clone(), response.answer.clone())
                    .await;
                if recorded.is_none() {
                    return Ok((StatusCode::NOT_FOUND, Json(session_not_found(session_id))));
                }

                let dto = AnswerResponseDto::new(session_id, question, response);
                Ok((StatusCode::OK, Json(ApiResponse::success(dto))))
            }
            Err(e) => {
                let (status, code) = error_status(&e);
                if status.is_server_error() {
                    tracing::error!("Chat turn failed in session {}: {}", session_id, e);
                } else {
                    tracing::warn!("Chat turn rejected in session {}: {}", session_id, e);
                }

                Ok((
                    status,
                    Json(ApiResponse::error(code, e.to_string(), None)),
                ))
            }
        }
    }
}

fn session_not_found<T>(session_id: Uuid) -> ApiResponse<T> {
    ApiResponse::error(
        "SESSION_NOT_FOUND",
        format!("Chat session {} does not exist", session_id),
        None,
    )
}

fn error_status(error: &AnswerQuestionError) -> (StatusCode, &'static str) {
    match error {
        AnswerQuestionError::IndexUnavailable => (StatusCode::CONFLICT, "INDEX_UNAVAILABLE"),
        AnswerQuestionError::EmptyQuestion => (StatusCode::BAD_REQUEST, "EMPTY_QUESTION"),
        AnswerQuestionError::RetrievalError(EmbeddingIndexError::ProviderError(_)) => {
            (StatusCode::BAD_GATEWAY, "EMBEDDING_FAILED")
        }
        AnswerQuestionError::RetrievalError(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "RETRIEVAL_FAILED")
        }
        AnswerQuestionError::LanguageModelError(_) => {
            (StatusCode::BAD_GATEWAY, "LANGUAGE_MODEL_FAILED")
        }
        AnswerQuestionError::WebSearchError(_) => (StatusCode::BAD_GATEWAY, "WEB_SEARCH_FAILED"),
    }
}
