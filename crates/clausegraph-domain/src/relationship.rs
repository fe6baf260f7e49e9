//! Relationship module - typed edges between merged clauses

use crate::ClauseId;

/// A relationship between two merged clauses
///
/// Relation types come from the document type's vocabulary, so they are
/// carried as strings rather than a closed enum.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// Source clause id
    pub source_id: ClauseId,

    /// Target clause id
    pub target_id: ClauseId,

    /// Relation type from the document type's vocabulary
    pub relation_type: String,

    /// Strength of relationship [0.0, 1.0]
    pub strength: f64,

    /// Optional condition under which the relationship holds
    pub condition: Option<String>,

    /// Whether source -> target direction is meaningful
    pub directed: bool,
}

impl Relationship {
    /// Create a new relationship
    pub fn new(
        source_id: ClauseId,
        target_id: ClauseId,
        relation_type: impl Into<String>,
        strength: f64,
        condition: Option<String>,
        directed: bool,
    ) -> Self {
        debug_assert!((0.0..=1.0).contains(&strength), "Strength must be in [0, 1]");

        Self {
            source_id,
            target_id,
            relation_type: relation_type.into(),
            strength: strength.clamp(0.0, 1.0),
            condition,
            directed,
        }
    }

    /// Key identifying this edge regardless of direction
    pub fn unordered_key(&self) -> (ClauseId, ClauseId, &str) {
        let (a, b) = if self.source_id <= self.target_id {
            (self.source_id, self.target_id)
        } else {
            (self.target_id, self.source_id)
        };
        (a, b, self.relation_type.as_str())
    }

    /// Whether both endpoints are the same clause
    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }
}
