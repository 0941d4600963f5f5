use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ProviderError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSearchResults {
    pub query: String,
    pub results: Vec<WebSearchResult>,
}

impl WebSearchResults {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Raw rendering of the hits, pasted as-is into the fallback prompt.
    pub fn to_prompt_context(&self) -> String {
        if self.results.is_empty() {
            return "No search results were found.".to_string();
        }

        self.results
            .iter()
            .enumerate()
            .map(|(i, result)| {
                format!(
                    "[{}] {} ({})\n{}",
                    i + 1,
                    result.title,
                    result.url,
                    result.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<WebSearchResults, ProviderError>;
}
