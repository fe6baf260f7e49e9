//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction engine and
//! the models it drives. Implementations live in other crates.

use crate::{ClauseCandidate, DocumentTypeConfig, FailureKind};
use async_trait::async_trait;
use thiserror::Error;

/// The only errors an [`ExtractionModel`] may report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Temporary condition (timeout, rate limit); worth retrying
    #[error("Transient extraction error: {0}")]
    Transient(String),

    /// Permanent condition (malformed output, auth failure); not retried
    #[error("Fatal extraction error: {0}")]
    Fatal(String),
}

impl ExtractionError {
    /// Whether the call may succeed if retried
    pub fn is_transient(&self) -> bool {
        matches!(self, ExtractionError::Transient(_))
    }

    /// Failure kind recorded in results
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractionError::Transient(_) => FailureKind::Transient,
            ExtractionError::Fatal(_) => FailureKind::Fatal,
        }
    }
}

/// Trait for text-generation providers
///
/// Implemented by the infrastructure layer (clausegraph-llm)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: std::fmt::Display + Into<ExtractionError> + Send;

    /// Generate a completion for the prompt
    async fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Name of the underlying model, for logs
    fn model_name(&self) -> &str;
}

/// Trait for proposing clause candidates from a chunk of text
///
/// This is the single seam to a non-deterministic model. Production code
/// binds it to an LLM (clausegraph-extractor's `PromptedModel`); tests bind
/// it to deterministic fakes.
#[async_trait]
pub trait ExtractionModel: Send + Sync {
    /// Propose clause candidates with chunk-local offsets
    async fn extract(
        &self,
        chunk_text: &str,
        config: &DocumentTypeConfig,
    ) -> Result<Vec<ClauseCandidate>, ExtractionError>;

    /// Name of the model, for logs
    fn name(&self) -> &str {
        "extraction-model"
    }
}
