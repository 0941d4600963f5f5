use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::application::ports::ProviderError;

pub fn build_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

pub fn request_error(error: reqwest::Error) -> ProviderError {
    ProviderError::NetworkError(error.without_url().to_string())
}

/// Maps non-2xx statuses onto `ProviderError` and decodes the JSON body.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::from_status(status.as_u16(), truncate(&body, 500)));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::InvalidResponse(e.without_url().to_string()))
}

pub fn require_key(key: &Option<String>, name: &str) -> Result<String, ProviderError> {
    key.clone()
        .ok_or_else(|| ProviderError::MissingCredentials(name.to_string()))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
