use std::sync::Arc;

use serde::Serialize;

use crate::application::ports::{LanguageModel, ProviderError, WebSearch, WebSearchResults};
use crate::application::services::{
    EmbeddingIndexError, EmbeddingIndexService, PromptTemplates, RetrievedChunk,
};

#[derive(Debug)]
pub enum AnswerQuestionError {
    IndexUnavailable,
    EmptyQuestion,
    RetrievalError(EmbeddingIndexError),
    LanguageModelError(ProviderError),
    WebSearchError(ProviderError),
}

impl std::fmt::Display for AnswerQuestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerQuestionError::IndexUnavailable => {
                write!(f, "No documents have been ingested yet")
            }
            AnswerQuestionError::EmptyQuestion => write!(f, "Question cannot be empty"),
            AnswerQuestionError::RetrievalError(e) => write!(f, "Retrieval failed: {}", e),
            AnswerQuestionError::LanguageModelError(e) => write!(f, "Language model failed: {}", e),
            AnswerQuestionError::WebSearchError(e) => write!(f, "Web search failed: {}", e),
        }
    }
}

impl std::error::Error for AnswerQuestionError {}

impl From<EmbeddingIndexError> for AnswerQuestionError {
    fn from(error: EmbeddingIndexError) -> Self {
        AnswerQuestionError::RetrievalError(error)
    }
}

/// Which step of the pipeline produced the final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Documents,
    WebSearch,
}

#[derive(Debug, Clone)]
pub struct AnswerQuestionResponse {
    pub answer: String,
    pub source: AnswerSource,
    pub context: Vec<RetrievedChunk>,
    pub search_results: Option<WebSearchResults>,
}

/// Retrieval-augmented answering with a single web-search fallback when the
/// model reports that the retrieved context is insufficient.
pub struct AnswerQuestionUseCase {
    embedding_index: Arc<EmbeddingIndexService>,
    language_model: Arc<dyn LanguageModel>,
    web_search: Arc<dyn WebSearch>,
    prompts: PromptTemplates,
    retrieval_k: usize,
}

impl AnswerQuestionUseCase {
    pub fn new(
        embedding_index: Arc<EmbeddingIndexService>,
        language_model: Arc<dyn LanguageModel>,
        web_search: Arc<dyn WebSearch>,
        retrieval_k: usize,
    ) -> Self {
        Self {
            embedding_index,
            language_model,
            web_search,
            prompts: PromptTemplates::default(),
            retrieval_k,
        }
    }

    pub async fn execute(
        &self,
        question: &str,
    ) -> Result<AnswerQuestionResponse, AnswerQuestionError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AnswerQuestionError::EmptyQuestion);
        }

        if !self.embedding_index.is_available().await {
            return Err(AnswerQuestionError::IndexUnavailable);
        }

        let context = self
            .embedding_index
            .retrieve(question, self.retrieval_k)
            .await?;

        tracing::debug!("Answering with {} context chunks", context.len());

        let draft = self
            .language_model
            .complete(&self.prompts.retrieval_prompt(&context, question))
            .await
            .map_err(AnswerQuestionError::LanguageModelError)?;

        if !self.prompts.signals_unanswerable(&draft) {
            return Ok(AnswerQuestionResponse {
                answer: draft,
                source: AnswerSource::Documents,
                context,
                search_results: None,
            });
        }

        tracing::info!("Context insufficient, falling back to web search");

        let search_results = self
            .web_search
            .search(question)
            .await
            .map_err(AnswerQuestionError::WebSearchError)?;

        let answer = self
            .language_model
            .complete(&self.prompts.web_fallback_prompt(&search_results, question))
            .await
            .map_err(AnswerQuestionError::LanguageModelError)?;

        Ok(AnswerQuestionResponse {
            answer,
            source: AnswerSource::WebSearch,
            context,
            search_results: Some(search_results),
        })
    }
}
