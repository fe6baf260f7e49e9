//! Extraction result - the immutable output of one extraction run

use crate::{ClauseId, MergedClause, Relationship};
use std::time::Duration;

/// Kind of error that ended an extraction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Retries were exhausted on transient errors
    Transient,
    /// The model reported an unrecoverable error
    Fatal,
}

impl FailureKind {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transient => "transient",
            FailureKind::Fatal => "fatal",
        }
    }
}

/// One chunk × pass extraction that did not produce candidates
#[derive(Debug, Clone, PartialEq)]
pub struct PassFailure {
    /// Pass number within the chunk
    pub pass: usize,
    /// Error kind of the final attempt
    pub kind: FailureKind,
    /// Number of attempts made
    pub attempts: usize,
    /// Error message of the final attempt
    pub message: String,
}

/// Failures recorded for one chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkFailure {
    /// Chunk index
    pub chunk_index: usize,
    /// Chunk start offset
    pub start_offset: usize,
    /// Chunk end offset
    pub end_offset: usize,
    /// Passes that failed, in pass order
    pub failed_passes: Vec<PassFailure>,
    /// True when every pass of the chunk failed
    pub total: bool,
}

/// Counters describing an extraction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Number of chunks the document was split into
    pub chunks: usize,
    /// Chunk × pass calls scheduled
    pub passes_attempted: usize,
    /// Chunk × pass calls that ended in failure
    pub passes_failed: usize,
    /// Candidates returned by the model
    pub candidates_proposed: usize,
    /// Candidates that passed grounding
    pub candidates_grounded: usize,
    /// Candidates dropped because their text did not match the source
    pub candidates_ungrounded: usize,
}

/// Result of extracting clauses from one document
///
/// Built once by the result assembler and read-only afterwards: fields
/// are private and only exposed through accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    document_type: String,
    clauses: Vec<MergedClause>,
    relationships: Vec<Relationship>,
    confidence_score: f64,
    processing_time: Duration,
    failures: Vec<ChunkFailure>,
    stats: ExtractionStats,
}

impl ExtractionResult {
    /// Create a result from already ordered and validated parts
    pub fn new(
        document_type: String,
        clauses: Vec<MergedClause>,
        relationships: Vec<Relationship>,
        confidence_score: f64,
        processing_time: Duration,
        failures: Vec<ChunkFailure>,
        stats: ExtractionStats,
    ) -> Self {
        Self {
            document_type,
            clauses,
            relationships,
            confidence_score,
            processing_time,
            failures,
            stats,
        }
    }

    /// Document type name
    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    /// Merged clauses ordered by start offset, then category
    pub fn clauses(&self) -> &[MergedClause] {
        &self.clauses
    }

    /// Inferred relationships
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Mean confidence over all clauses (0.0 when there are none)
    pub fn confidence_score(&self) -> f64 {
        self.confidence_score
    }

    /// Wall-clock time spent extracting
    pub fn processing_time(&self) -> Duration {
        self.processing_time
    }

    /// Per-chunk failures encountered during the run
    pub fn failures(&self) -> &[ChunkFailure] {
        &self.failures
    }

    /// Run counters
    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }

    /// Look up a clause by id
    pub fn clause(&self, id: ClauseId) -> Option<&MergedClause> {
        self.clauses.iter().find(|c| c.id == id)
    }

    /// Whether any chunk × pass failed during the run
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}
