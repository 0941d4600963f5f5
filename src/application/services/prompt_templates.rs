use regex::{Regex, RegexBuilder};

use super::embedding_index::RetrievedChunk;
use crate::application::ports::WebSearchResults;

pub const UNANSWERABLE_SENTINEL: &str = "unanswerable";

/// Builds the two prompts of the answer pipeline and recognises the marker
/// the model emits when the retrieved context is not enough.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    sentinel: String,
    sentinel_pattern: Regex,
}

impl PromptTemplates {
    pub fn new(sentinel: &str) -> Result<Self, regex::Error> {
        let sentinel_pattern = RegexBuilder::new(&regex::escape(sentinel))
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            sentinel: sentinel.to_string(),
            sentinel_pattern,
        })
    }

    pub fn retrieval_prompt(&self, context: &[RetrievedChunk], question: &str) -> String {
        let context = context
            .iter()
            .map(|retrieved| retrieved.chunk.chunk_text())
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "Answer based on context. If unanswerable, say '{}'. Context: {}\nQuestion: {}",
            self.sentinel, context, question
        )
    }

    pub fn web_fallback_prompt(&self, results: &WebSearchResults, question: &str) -> String {
        format!(
            "Answer this: Based on these search results: {}, answer the question: {}",
            results.to_prompt_context(),
            question
        )
    }

    /// Case-insensitive substring match on the sentinel. A response that
    /// merely mentions the word also counts.
    pub fn signals_unanswerable(&self, response: &str) -> bool {
        self.sentinel_pattern.is_match(response)
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::new(UNANSWERABLE_SENTINEL)
            .unwrap_or_else(|_| unreachable!("escaped literal is always a valid pattern"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::WebSearchResult;
    use crate::test_support::chunk;

    #[test]
    fn test_sentinel_detection_is_case_insensitive_substring() {
        let templates = PromptTemplates::default();

        assert!(templates.signals_unanswerable("unanswerable"));
        assert!(templates.signals_unanswerable("UNANSWERABLE."));
        assert!(templates.signals_unanswerable("Sorry, this is Unanswerable from the notes"));
        assert!(!templates.signals_unanswerable("The answer is 42."));
        assert!(!templates.signals_unanswerable("answerable"));
    }

    #[test]
    fn test_custom_sentinel_is_escaped() {
        let templates = PromptTemplates::new("[no-answer]").unwrap();
        assert!(templates.signals_unanswerable("result: [NO-ANSWER]"));
        assert!(!templates.signals_unanswerable("n"));
    }

    #[test]
    fn test_retrieval_prompt_contains_context_and_question() {
        let templates = PromptTemplates::default();
        let context = vec![
            RetrievedChunk {
                chunk: chunk("ATP is made in mitochondria.", 0),
                similarity_score: 0.9,
            },
            RetrievedChunk {
                chunk: chunk("Ribosomes build proteins.", 1),
                similarity_score: 0.5,
            },
        ];

        let prompt = templates.retrieval_prompt(&context, "Where is ATP made?");

        assert!(prompt.contains("ATP is made in mitochondria.\n\nRibosomes build proteins."));
        assert!(prompt.contains("'unanswerable'"));
        assert!(prompt.ends_with("\nQuestion: Where is ATP made?"));
    }

    #[test]
    fn test_web_fallback_prompt_embeds_raw_results() {
        let templates = PromptTemplates::default();
        let results = WebSearchResults {
            query: "capital of peru".to_string(),
            results: vec![WebSearchResult {
                title: "Peru".to_string(),
                url: "https://example.org/peru".to_string(),
                content: "Lima is the capital.".to_string(),
            }],
        };

        let prompt = templates.web_fallback_prompt(&results, "What is the capital of Peru?");

        assert!(prompt.contains("Lima is the capital."));
        assert!(prompt.starts_with("Answer this: Based on these search results:"));
        assert!(prompt.ends_with("answer the question: What is the capital of Peru?"));
    }
}
