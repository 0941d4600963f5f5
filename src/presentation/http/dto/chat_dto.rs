use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::RetrievedChunk;
use crate::application::use_cases::{AnswerQuestionResponse, AnswerSource};
use crate::domain::entities::{ChatSession, ConversationTurn, Role};

#[derive(Debug, Deserialize)]
pub struct AskQuestionDto {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationTurnDto {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ChatSessionDto {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub turns: Vec<ConversationTurnDto>,
}

#[derive(Debug, Serialize)]
pub struct ContextChunkDto {
    pub source: String,
    pub page_number: Option<u32>,
    /// `lecture.pdf p.3`, or the bare file name for images.
    pub citation: String,
    pub chunk_text: String,
    pub similarity_score: f32,
}

#[derive(Debug, Serialize)]
pub struct WebResultDto {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponseDto {
    pub session_id: Uuid,
    pub question: String,
    pub answer: String,
    pub source: AnswerSource,
    pub context: Vec<ContextChunkDto>,
    pub web_results: Vec<WebResultDto>,
}

impl From<&ConversationTurn> for ConversationTurnDto {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role(),
            content: turn.content().to_string(),
            created_at: turn.created_at(),
        }
    }
}

impl From<&ChatSession> for ChatSessionDto {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id(),
            created_at: session.created_at(),
            turns: session.turns().iter().map(ConversationTurnDto::from).collect(),
        }
    }
}

impl From<RetrievedChunk> for ContextChunkDto {
    fn from(retrieved: RetrievedChunk) -> Self {
        Self {
            source: retrieved.chunk.source().to_string(),
            page_number: retrieved.chunk.page_number(),
            citation: retrieved.chunk.metadata().citation(),
            chunk_text: retrieved.chunk.chunk_text().to_string(),
            similarity_score: retrieved.similarity_score,
        }
    }
}

impl AnswerResponseDto {
    pub fn new(session_id: Uuid, question: String, response: AnswerQuestionResponse) -> Self {
        Self {
            session_id,
            question,
            answer: response.answer,
            source: response.source,
            context: response
                .context
                .into_iter()
                .map(ContextChunkDto::from)
                .collect(),
            web_results: response
                .search_results
                .map(|results| {
                    results
                        .results
                        .into_iter()
                        .map(|r| WebResultDto {
                            title: r.title,
                            url: r.url,
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}
