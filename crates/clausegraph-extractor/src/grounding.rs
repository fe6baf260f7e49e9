//! Source grounding: map candidates to document offsets and verify them

use clausegraph_domain::{Chunk, ClauseCandidate, GroundedClause};
use tracing::debug;

/// Grounded clauses from one chunk × pass, plus how many were dropped
#[derive(Debug, Default)]
pub struct GroundingOutcome {
    /// Candidates whose text matched the document exactly
    pub grounded: Vec<GroundedClause>,
    /// Candidates dropped as ungrounded
    pub dropped: usize,
}

/// Resolve one candidate against the document
///
/// Returns `None` when the text at `chunk.start_offset + local span` is
/// not exactly the candidate text. That is an expected event for a noisy
/// model, logged and discarded, never an error.
pub fn resolve(
    document: &str,
    candidate: &ClauseCandidate,
    chunk: &Chunk,
) -> Option<GroundedClause> {
    match GroundedClause::try_ground(document, candidate, chunk) {
        Ok(grounded) => Some(grounded),
        Err(mismatch) => {
            debug!(
                event = "ungrounded_candidate_dropped",
                chunk = chunk.index,
                pass = candidate.pass,
                category = %candidate.category,
                "{}",
                mismatch
            );
            None
        }
    }
}

/// Resolve every candidate produced for a chunk
pub fn resolve_all(document: &str, chunk: &Chunk, candidates: &[ClauseCandidate]) -> GroundingOutcome {
    let mut outcome = GroundingOutcome::default();
    for candidate in candidates {
        match resolve(document, candidate, chunk) {
            Some(grounded) => outcome.grounded.push(grounded),
            None => outcome.dropped += 1,
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Agreement. Monthly rent: Rs. 25,000/-. Deposit: Rs. 50,000.";

    #[test]
    fn test_resolve_uses_chunk_offset() {
        let chunk = Chunk::new(1, 11, DOC.len());
        let candidate = ClauseCandidate::new("financial_term", "Monthly rent: Rs. 25,000/-", 0, 26);

        let grounded = resolve(DOC, &candidate, &chunk).unwrap();
        assert_eq!(grounded.start_offset(), 11);
        assert_eq!(grounded.end_offset(), 37);
        assert_eq!(&DOC[11..37], grounded.text());
    }

    #[test]
    fn test_resolve_drops_misoffset_candidate() {
        let chunk = Chunk::new(0, 0, DOC.len());
        // Right text, offsets shifted by one
        let candidate = ClauseCandidate::new("financial_term", "Monthly rent", 12, 24);
        assert!(resolve(DOC, &candidate, &chunk).is_none());
    }

    #[test]
    fn test_resolve_all_counts_drops() {
        let chunk = Chunk::new(0, 0, DOC.len());
        let candidates = vec![
            ClauseCandidate::new("financial_term", "Monthly rent", 11, 23),
            ClauseCandidate::new("financial_term", "Monthly Rent", 11, 23),
            ClauseCandidate::new("security_deposit", "Deposit: Rs. 50,000", 39, 58),
        ];

        let outcome = resolve_all(DOC, &chunk, &candidates);
        assert_eq!(outcome.grounded.len(), 2);
        assert_eq!(outcome.dropped, 1);
    }
}
