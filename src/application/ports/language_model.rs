use async_trait::async_trait;

use super::ProviderError;

/// Single-turn text completion. No conversation history is ever passed.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    fn model_name(&self) -> &str;
}
