//! Clausegraph LLM Provider Layer
//!
//! Pluggable text-generation providers behind the `LlmProvider` trait from
//! `clausegraph-domain`. The extractor turns any of these into a clause
//! extraction model by wrapping it in `PromptedModel`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scripted replies for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use clausegraph_llm::MockProvider;
//! use clausegraph_domain::LlmProvider;
//!
//! # async fn example() {
//! let provider = MockProvider::new("[]");
//! let reply = provider.generate("any prompt").await.unwrap();
//! assert_eq!(reply, "[]");
//! # }
//! ```

#![warn(missing_docs)]

pub mod ollama;

use async_trait::async_trait;
use clausegraph_domain::{ExtractionError, LlmProvider};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Credentials rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::Communication(_) | LlmError::Timeout | LlmError::RateLimitExceeded
        )
    }
}

impl From<LlmError> for ExtractionError {
    fn from(e: LlmError) -> Self {
        if e.is_transient() {
            ExtractionError::Transient(e.to_string())
        } else {
            ExtractionError::Fatal(e.to_string())
        }
    }
}

/// Mock LLM provider for deterministic testing
///
/// Replies are chosen in this order:
/// 1. the next queued reply, if any were queued with [`MockProvider::enqueue`]
/// 2. the first rule whose key is a substring of the prompt
/// 3. the default reply
///
/// # Examples
///
/// ```
/// use clausegraph_llm::{LlmError, MockProvider};
/// use clausegraph_domain::LlmProvider;
///
/// # async fn example() {
/// let provider = MockProvider::new("[]");
/// provider.add_response("Monthly rent", r#"[{"category":"financial_term","text":"Rs. 25,000/-"}]"#);
/// provider.enqueue(Err(LlmError::RateLimitExceeded));
///
/// assert!(provider.generate("Monthly rent: Rs. 25,000/-").await.is_err());
/// assert!(provider.generate("Monthly rent: Rs. 25,000/-").await.unwrap().contains("financial_term"));
/// assert_eq!(provider.call_count(), 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, String)>>>,
    queue: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    call_count: Arc<Mutex<usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed default reply
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Reply with `response` whenever the prompt contains `needle`
    pub fn add_response(&self, needle: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).push((needle.into(), response.into()));
    }

    /// Queue a one-shot reply or error, consumed before any rule applies
    pub fn enqueue(&self, reply: Result<String, LlmError>) {
        lock(&self.queue).push_back(reply);
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        *lock(&self.call_count) += 1;

        if let Some(reply) = lock(&self.queue).pop_front() {
            return reply;
        }

        let responses = lock(&self.responses);
        if let Some((_, response)) = responses.iter().find(|(needle, _)| prompt.contains(needle.as_str())) {
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
