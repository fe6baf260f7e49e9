//! Result assembly
//!
//! Final consistency pass before a result leaves the engine: clauses are
//! ordered by span, relationships must point at clauses that exist, and
//! the aggregate confidence is the mean clause confidence.

use clausegraph_domain::{
    ChunkFailure, ClauseId, ExtractionResult, ExtractionStats, MergedClause, Relationship,
};
use std::collections::HashSet;
use std::time::Duration;
use tracing::warn;

/// Pieces produced by the pipeline, ready to assemble
#[derive(Debug, Default)]
pub struct AssemblyInput {
    /// Merged clauses in any order
    pub clauses: Vec<MergedClause>,
    /// Inferred relationships
    pub relationships: Vec<Relationship>,
    /// Per-chunk failure records
    pub failures: Vec<ChunkFailure>,
    /// Pipeline counters
    pub stats: ExtractionStats,
}

/// Build an [`ExtractionResult`]
pub fn assemble(document_type: &str, input: AssemblyInput, processing_time: Duration) -> ExtractionResult {
    let AssemblyInput {
        mut clauses,
        relationships,
        mut failures,
        stats,
    } = input;

    clauses.sort_by(MergedClause::cmp_position);

    let ids: HashSet<ClauseId> = clauses.iter().map(|c| c.id).collect();
    let relationships: Vec<Relationship> = relationships
        .into_iter()
        .filter(|r| {
            let keep = !r.is_self_loop() && ids.contains(&r.source_id) && ids.contains(&r.target_id);
            if !keep {
                warn!(
                    source = %r.source_id,
                    target = %r.target_id,
                    relation = %r.relation_type,
                    "Dropping relationship with missing or identical endpoints"
                );
            }
            keep
        })
        .collect();

    failures.sort_by_key(|f| f.chunk_index);

    let confidence_score = aggregate_confidence(&clauses);
    ExtractionResult::new(
        document_type.to_string(),
        clauses,
        relationships,
        confidence_score,
        processing_time,
        failures,
        stats,
    )
}

/// Arithmetic mean of clause confidences, 0.0 when there are none
pub fn aggregate_confidence(clauses: &[MergedClause]) -> f64 {
    if clauses.is_empty() {
        return 0.0;
    }
    clauses.iter().map(|c| c.confidence).sum::<f64>() / clauses.len() as f64
}
