//! Structured serialization of extraction results
//!
//! `ResultDocument` is the persistence and visualization view of an
//! [`ExtractionResult`]: plain records, ids rendered as UUID strings, no
//! behavior. Writing it anywhere is the job of a [`ResultSink`].

use crate::error::ExtractorError;
use clausegraph_domain::{
    Attributes, ChunkFailure, ExtractionResult, ExtractionStats, MergedClause, PassFailure,
    Relationship,
};
use serde::{Deserialize, Serialize};

/// Serialized extraction result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    /// Document type name
    pub document_type: String,
    /// Clauses in document order
    pub clauses: Vec<ClauseRecord>,
    /// Relationships between clauses
    pub relationships: Vec<RelationshipRecord>,
    /// Mean clause confidence
    pub confidence_score: f64,
    /// Wall-clock extraction time
    pub processing_time_seconds: f64,
    /// Per-chunk failures
    pub failures: Vec<FailureRecord>,
    /// Pipeline counters
    pub stats: StatsRecord,
}

/// Serialized clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseRecord {
    /// Clause id
    pub id: String,
    /// Clause category
    pub category: String,
    /// Exact source text
    pub text: String,
    /// Start byte offset
    pub start_offset: usize,
    /// End byte offset
    pub end_offset: usize,
    /// Reconciled attributes
    pub attributes: Attributes,
    /// Agreement-based confidence
    pub confidence: f64,
    /// Number of agreeing passes
    pub support_count: usize,
}

/// Serialized relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// Source clause id
    pub source_id: String,
    /// Target clause id
    pub target_id: String,
    /// Relation type
    #[serde(rename = "type")]
    pub relation_type: String,
    /// Relationship strength
    pub strength: f64,
    /// Condition under which the relationship holds
    pub condition: Option<String>,
    /// Whether direction is meaningful
    pub directed: bool,
}

/// Serialized chunk failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Chunk index
    pub chunk_index: usize,
    /// Chunk start offset
    pub start_offset: usize,
    /// Chunk end offset
    pub end_offset: usize,
    /// Whether every pass of the chunk failed
    pub total: bool,
    /// Failed passes
    pub failed_passes: Vec<PassFailureRecord>,
}

/// Serialized pass failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassFailureRecord {
    /// Pass number
    pub pass: usize,
    /// "transient" or "fatal"
    pub kind: String,
    /// Attempts made
    pub attempts: usize,
    /// Final error message
    pub message: String,
}

/// Serialized pipeline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    /// Chunks
    pub chunks: usize,
    /// Chunk × pass calls scheduled
    pub passes_attempted: usize,
    /// Chunk × pass calls failed
    pub passes_failed: usize,
    /// Candidates proposed by the model
    pub candidates_proposed: usize,
    /// Candidates grounded
    pub candidates_grounded: usize,
    /// Candidates dropped as ungrounded
    pub candidates_ungrounded: usize,
}

impl From<&MergedClause> for ClauseRecord {
    fn from(clause: &MergedClause) -> Self {
        Self {
            id: clause.id.to_string(),
            category: clause.category.clone(),
            text: clause.text.clone(),
            start_offset: clause.start_offset,
            end_offset: clause.end_offset,
            attributes: clause.attributes.clone(),
            confidence: clause.confidence,
            support_count: clause.support_count,
        }
    }
}

impl From<&Relationship> for RelationshipRecord {
    fn from(rel: &Relationship) -> Self {
        Self {
            source_id: rel.source_id.to_string(),
            target_id: rel.target_id.to_string(),
            relation_type: rel.relation_type.clone(),
            strength: rel.strength,
            condition: rel.condition.clone(),
            directed: rel.directed,
        }
    }
}

impl From<&PassFailure> for PassFailureRecord {
    fn from(failure: &PassFailure) -> Self {
        Self {
            pass: failure.pass,
            kind: failure.kind.as_str().to_string(),
            attempts: failure.attempts,
            message: failure.message.clone(),
        }
    }
}

impl From<&ChunkFailure> for FailureRecord {
    fn from(failure: &ChunkFailure) -> Self {
        Self {
            chunk_index: failure.chunk_index,
            start_offset: failure.start_offset,
            end_offset: failure.end_offset,
            total: failure.total,
            failed_passes: failure.failed_passes.iter().map(PassFailureRecord::from).collect(),
        }
    }
}

impl From<&ExtractionStats> for StatsRecord {
    fn from(stats: &ExtractionStats) -> Self {
        Self {
            chunks: stats.chunks,
            passes_attempted: stats.passes_attempted,
            passes_failed: stats.passes_failed,
            candidates_proposed: stats.candidates_proposed,
            candidates_grounded: stats.candidates_grounded,
            candidates_ungrounded: stats.candidates_ungrounded,
        }
    }
}

impl From<&ExtractionResult> for ResultDocument {
    fn from(result: &ExtractionResult) -> Self {
        Self {
            document_type: result.document_type().to_string(),
            clauses: result.clauses().iter().map(ClauseRecord::from).collect(),
            relationships: result.relationships().iter().map(RelationshipRecord::from).collect(),
            confidence_score: result.confidence_score(),
            processing_time_seconds: result.processing_time().as_secs_f64(),
            failures: result.failures().iter().map(FailureRecord::from).collect(),
            stats: StatsRecord::from(result.stats()),
        }
    }
}

impl ResultDocument {
    /// Compact JSON
    pub fn to_json(&self) -> Result<String, ExtractorError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON
    pub fn to_json_pretty(&self) -> Result<String, ExtractorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a previously serialized document
    pub fn from_json(json: &str) -> Result<Self, ExtractorError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Destination for serialized results (file, database, message queue, ...)
///
/// Implemented outside the engine; the engine itself never performs I/O.
pub trait ResultSink {
    /// Error type for sink operations
    type Error: std::fmt::Display;

    /// Persist one serialized result
    fn persist(&mut self, document: &ResultDocument) -> Result<(), Self::Error>;
}
