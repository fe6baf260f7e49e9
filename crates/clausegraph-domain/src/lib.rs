//! Clausegraph Domain Layer
//!
//! Core value types for turning legal document text into source-grounded
//! clauses and the relationships between them. This crate carries no I/O
//! and no runtime; it defines the data model and the trait seams that the
//! infrastructure crates implement.
//!
//! ## Key Concepts
//!
//! - **Chunk**: an offset-tracked window over the source document
//! - **Clause candidate**: one raw proposal from a single model pass
//! - **Grounded clause**: a candidate whose text is verified against the
//!   source at its global offsets
//! - **Merged clause**: the canonical clause agreed on across passes,
//!   scored by how many passes agree
//! - **Relationship**: a typed edge between two merged clauses
//! - **Document type config**: per-type extraction instructions, examples,
//!   limits and relation vocabulary, held as plain data
//!
//! ## Architecture
//!
//! - No async runtime, no network, no filesystem
//! - Infrastructure implementations live in other crates
//! - Trait definitions for every external interaction

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod clause;
pub mod relationship;
pub mod result;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use chunk::Chunk;
pub use clause::{
    Attributes, ClauseCandidate, ClauseId, GroundedClause, GroundingMismatch, MergedClause,
};
pub use relationship::Relationship;
pub use result::{
    ChunkFailure, ExtractionResult, ExtractionStats, FailureKind, PassFailure,
};
pub use schema::{DocumentTypeConfig, ExampleClause, FewShotExample, RelationRule};
pub use traits::{ExtractionError, ExtractionModel, LlmProvider};
