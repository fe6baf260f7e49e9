//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
///
/// Per-chunk model failures never show up here; they are recorded in the
/// result's failure list. Only caller errors and total failure do.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Document type is not registered
    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),

    /// Document text is empty
    #[error("Document text is empty")]
    EmptyDocument,

    /// Text exceeds maximum length
    #[error("Text too long: {0} bytes (max: {1})")]
    TextTooLong(usize, usize),

    /// Every chunk failed on every pass
    #[error("All {chunks} chunks failed extraction; last error: {last_error}")]
    AllChunksFailed {
        /// Number of chunks in the document
        chunks: usize,
        /// Message of the last recorded failure
        last_error: String,
    },

    /// Document type configuration is invalid
    #[error("Schema error: {0}")]
    Schema(String),

    /// Engine configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonParse(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
