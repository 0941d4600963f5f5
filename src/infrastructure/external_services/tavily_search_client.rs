use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http_support::{build_client, read_json, request_error, require_key};
use super::retry::RetryPolicy;
use crate::application::ports::{ProviderError, WebSearch, WebSearchResult, WebSearchResults};
use crate::infrastructure::config::SearchSettings;

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

pub struct TavilySearchClient {
    client: Client,
    settings: SearchSettings,
    retry: RetryPolicy,
}

impl TavilySearchClient {
    pub fn new(
        settings: SearchSettings,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            settings,
            retry,
        })
    }

    async fn execute_request(
        &self,
        api_key: &str,
        query: &str,
    ) -> Result<WebSearchResults, ProviderError> {
        let body = SearchRequest {
            api_key,
            query,
            max_results: self.settings.max_results,
            search_depth: "basic",
        };

        let response = self
            .client
            .post(TAVILY_SEARCH_URL)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let parsed: SearchResponse = read_json(response).await?;
        Ok(into_results(query, parsed))
    }
}

fn into_results(query: &str, response: SearchResponse) -> WebSearchResults {
    WebSearchResults {
        query: query.to_string(),
        results: response
            .results
            .into_iter()
            .map(|hit| WebSearchResult {
                title: hit.title,
                url: hit.url,
                content: hit.content,
            })
            .collect(),
    }
}

#[async_trait]
impl WebSearch for TavilySearchClient {
    async fn search(&self, query: &str) -> Result<WebSearchResults, ProviderError> {
        let api_key = require_key(&self.settings.api_key, "TAVILY_API_KEY")?;

        let results = self
            .retry
            .run("web search", || self.execute_request(&api_key, query))
            .await?;

        tracing::info!("Web search returned {} results", results.len());
        Ok(results)
    }
}
