//! Extraction model backed by a text-generation provider

use crate::parser::parse_model_response;
use crate::prompt::PromptBuilder;
use async_trait::async_trait;
use clausegraph_domain::{
    ClauseCandidate, DocumentTypeConfig, ExtractionError, ExtractionModel, LlmProvider,
};
use tracing::debug;

/// Adapts any [`LlmProvider`] into an [`ExtractionModel`]
///
/// Builds a few-shot prompt from the document type config, sends it to the
/// provider and parses the reply into candidates. Provider errors keep
/// their transient/fatal classification; unparseable replies are fatal.
pub struct PromptedModel<L: LlmProvider> {
    provider: L,
}

impl<L: LlmProvider> PromptedModel<L> {
    /// Wrap a provider
    pub fn new(provider: L) -> Self {
        Self { provider }
    }

    /// Borrow the wrapped provider
    pub fn provider(&self) -> &L {
        &self.provider
    }
}

#[async_trait]
impl<L: LlmProvider> ExtractionModel for PromptedModel<L> {
    async fn extract(
        &self,
        chunk_text: &str,
        config: &DocumentTypeConfig,
    ) -> Result<Vec<ClauseCandidate>, ExtractionError> {
        let prompt = PromptBuilder::new(config, chunk_text).build();
        debug!("Prompt length: {} chars", prompt.len());

        let response = self
            .provider
            .generate(&prompt)
            .await
            .map_err(Into::<ExtractionError>::into)?;
        debug!("LLM response length: {} chars", response.len());

        parse_model_response(&response, chunk_text, config)
    }

    fn name(&self) -> &str {
        self.provider.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchemaRegistry;
    use clausegraph_llm::{LlmError, MockProvider};

    #[tokio::test]
    async fn test_prompted_model_parses_reply() {
        let provider = MockProvider::new(
            r#"{"extractions": [{"category": "financial_term", "text": "Rs. 25,000/-"}]}"#,
        );
        let model = PromptedModel::new(provider.clone());
        let registry = SchemaRegistry::builtin().unwrap();
        let config = registry.get_config("rental").unwrap();

        let candidates = model
            .extract("Monthly rent: Rs. 25,000/-", config)
            .await
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].local_start, 14);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(model.name(), "mock");
    }

    #[tokio::test]
    async fn test_prompted_model_keeps_error_classification() {
        let provider = MockProvider::default();
        provider.enqueue(Err(LlmError::RateLimitExceeded));
        provider.enqueue(Err(LlmError::Unauthorized("bad key".into())));
        let model = PromptedModel::new(provider);
        let registry = SchemaRegistry::builtin().unwrap();
        let config = registry.get_config("loan").unwrap();

        let first = model.extract("text", config).await.unwrap_err();
        let second = model.extract("text", config).await.unwrap_err();
        assert!(first.is_transient());
        assert!(!second.is_transient());
    }

    #[tokio::test]
    async fn test_prompted_model_garbage_reply_is_fatal() {
        let model = PromptedModel::new(MockProvider::new("I cannot help with that."));
        let registry = SchemaRegistry::builtin().unwrap();
        let config = registry.get_config("terms_of_service").unwrap();

        let err = model.extract("text", config).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Fatal(_)));
    }
}
