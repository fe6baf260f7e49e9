//! Clausegraph Extractor
//!
//! Turns legal documents into grounded, confidence-scored clauses and the
//! relationships between them.
//!
//! # Architecture
//!
//! ```text
//! text ─▶ Chunker ─▶ ExtractionModel (chunk × pass, bounded pool, retries)
//!      ─▶ Grounding ─▶ Merger ─▶ RelationshipInferencer ─▶ ExtractionResult
//! ```
//!
//! # Key Features
//!
//! - **Source grounding**: every clause's text is the exact document slice at
//!   its offsets; anything the model cannot ground is dropped
//! - **Multi-pass agreement**: each chunk is read several times and
//!   confidence comes from how many passes agree, not from the model
//! - **Data-driven document types**: categories, prompts, examples, limits and
//!   relation vocabularies live in TOML, selected by name
//! - **Partial failure tolerance**: failed chunks degrade the result instead of
//!   aborting it
//!
//! # Example Usage
//!
//! ```no_run
//! use clausegraph_extractor::{ClauseExtractor, ExtractorConfig, PromptedModel, ResultDocument, SchemaRegistry};
//! use clausegraph_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let model = PromptedModel::new(MockProvider::new("[]"));
//! let extractor = ClauseExtractor::new(model, SchemaRegistry::builtin()?, ExtractorConfig::default())?;
//!
//! let result = extractor
//!     .extract("Monthly rent: Rs. 25,000/- payable on the 5th.", "rental")
//!     .await?;
//!
//! println!("{} clauses, confidence {:.2}", result.clauses().len(), result.confidence_score());
//! println!("{}", ResultDocument::from(&result).to_json_pretty()?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod assembler;
mod chunking;
mod config;
mod error;
mod extractor;
mod grounding;
mod merger;
mod model;
mod parser;
mod prompt;
mod relations;
mod retry;
mod schema;
mod serialize;


pub use assembler::{aggregate_confidence, assemble, AssemblyInput};
pub use chunking::{split, TextChunker, DEFAULT_SLACK_RATIO};
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::ClauseExtractor;
pub use grounding::{resolve, resolve_all, GroundingOutcome};
pub use merger::merge;
pub use model::PromptedModel;
pub use parser::parse_model_response;
pub use prompt::PromptBuilder;
pub use relations::RelationshipInferencer;
pub use retry::RetryPolicy;
pub use schema::SchemaRegistry;
pub use serialize::{
    ClauseRecord, FailureRecord, PassFailureRecord, RelationshipRecord, ResultDocument,
    ResultSink, StatsRecord,
};
