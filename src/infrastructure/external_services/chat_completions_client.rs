use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::http_support::{build_client, read_json, request_error, require_key};
use super::retry::RetryPolicy;
use crate::application::ports::{LanguageModel, ProviderError};
use crate::infrastructure::config::LanguageModelSettings;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Single-turn completion against any OpenAI-compatible
/// `/chat/completions` endpoint (Groq by default).
pub struct ChatCompletionsClient {
    client: Client,
    settings: LanguageModelSettings,
    retry: RetryPolicy,
}

impl ChatCompletionsClient {
    pub fn new(
        settings: LanguageModelSettings,
        timeout_secs: u64,
        retry: RetryPolicy,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            settings,
            retry,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    async fn execute_request(&self, api_key: &str, prompt: &str) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key.trim())
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let parsed: ChatResponse = read_json(response).await?;
        first_message(parsed)
    }
}

fn first_message(response: ChatResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .find_map(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| ProviderError::InvalidResponse("Completion had no content".to_string()))
}

#[async_trait]
impl LanguageModel for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = require_key(&self.settings.api_key, "GROQ_API_KEY")?;

        self.retry
            .run("chat completion", || self.execute_request(&api_key, prompt))
            .await
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: Option<&str>) -> LanguageModelSettings {
        LanguageModelSettings {
            base_url: "https://api.groq.com/openai/v1/".to_string(),
            api_key: api_key.map(str::to_string),
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.7,
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "llama-3.1-8b-instant",
            temperature: 0.5,
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "model": "llama-3.1-8b-instant",
                "temperature": 0.5,
                "messages": [{ "role": "user", "content": "hi" }]
            })
        );
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = ChatCompletionsClient::new(settings(None), 5, RetryPolicy::none()).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn test_first_message_extraction() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Paris."}}]}"#,
        )
        .unwrap();
        assert_eq!(first_message(parsed).unwrap(), "Paris.");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            first_message(empty),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let client = ChatCompletionsClient::new(settings(None), 5, RetryPolicy::none()).unwrap();

        assert_eq!(
            client.complete("hello").await.unwrap_err(),
            ProviderError::MissingCredentials("GROQ_API_KEY".to_string())
        );
    }
}
