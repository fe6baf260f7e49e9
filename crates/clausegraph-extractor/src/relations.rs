//! Relationship inference over merged clauses
//!
//! A pair of clauses is related when the document type's vocabulary lists
//! their categories as related AND the clauses are either close together
//! (within `proximity_window_chunks` chunks) or one of them explicitly
//! references the other through a reference attribute.

use crate::config::ExtractorConfig;
use clausegraph_domain::{ClauseId, DocumentTypeConfig, MergedClause, RelationRule, Relationship};
use std::collections::BTreeMap;
use tracing::debug;

/// Infers typed relationships between merged clauses
pub struct RelationshipInferencer<'a> {
    schema: &'a DocumentTypeConfig,
    proximity_window: usize,
    proximity_factor: f64,
}

impl<'a> RelationshipInferencer<'a> {
    /// Create an inferencer for one document type
    pub fn new(schema: &'a DocumentTypeConfig, config: &ExtractorConfig) -> Self {
        Self {
            schema,
            proximity_window: config.proximity_window_chunks,
            proximity_factor: config.proximity_factor,
        }
    }

    /// Infer relationships, sorted by `(source_id, target_id, type)`
    ///
    /// Never produces self-loops. Edges on the same unordered pair with the
    /// same type are collapsed, keeping the strongest.
    pub fn infer(&self, clauses: &[MergedClause]) -> Vec<Relationship> {
        let mut edges = Vec::new();
        for (i, a) in clauses.iter().enumerate() {
            for b in &clauses[i + 1..] {
                if a.id == b.id {
                    continue;
                }
                edges.extend(
                    self.schema
                        .rules_between(&a.category, &b.category)
                        .filter_map(|rule| self.relate(a, b, rule)),
                );
            }
        }

        let relationships = collapse(edges);
        debug!(relationships = relationships.len(), "Inferred relationships");
        relationships
    }

    fn relate(&self, a: &MergedClause, b: &MergedClause, rule: &RelationRule) -> Option<Relationship> {
        let referenced = self.references(a, b) || self.references(b, a);
        let near = a.chunk_distance(b) <= self.proximity_window;
        if !referenced && !near {
            return None;
        }

        // Orient along the rule; same-category rules keep document order
        let (source, target) = if rule.source == a.category {
            (a, b)
        } else {
            (b, a)
        };

        let mut strength = (source.confidence + target.confidence) / 2.0;
        if !referenced {
            strength *= self.proximity_factor;
        }

        let condition = source
            .attributes
            .get("condition")
            .cloned()
            .or_else(|| rule.condition.clone());

        Some(Relationship::new(
            source.id,
            target.id,
            rule.relation_type.clone(),
            strength.clamp(0.0, 1.0),
            condition,
            rule.directed,
        ))
    }

    /// Whether `from` names `to` in one of its reference attributes
    fn references(&self, from: &MergedClause, to: &MergedClause) -> bool {
        let id = to.id.to_string();
        self.schema
            .reference_attributes
            .iter()
            .filter_map(|key| from.attributes.get(key))
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .any(|target| !target.is_empty() && (target == id || target == to.text))
    }
}

/// Keep the strongest edge per unordered pair and type, sorted by
/// `(source_id, target_id, type)`
///
/// Among equally strong edges the first one wins.
fn collapse(edges: impl IntoIterator<Item = Relationship>) -> Vec<Relationship> {
    let mut strongest: BTreeMap<(ClauseId, ClauseId, String), Relationship> = BTreeMap::new();
    for edge in edges {
        let (x, y, kind) = edge.unordered_key();
        let key = (x, y, kind.to_string());
        match strongest.get(&key) {
            Some(existing) if existing.strength >= edge.strength => {}
            _ => {
                strongest.insert(key, edge);
            }
        }
    }

    let mut relationships: Vec<Relationship> = strongest.into_values().collect();
    relationships.sort_by(|r, s| {
        (r.source_id, r.target_id, &r.relation_type).cmp(&(s.source_id, s.target_id, &s.relation_type))
    });
    relationships
}

#[cfg(test)]
mod tests {
    use super::*;
    use clausegraph_domain::Attributes;

    fn schema() -> DocumentTypeConfig {
        toml::from_str(
            r#"
            name = "rental"
            instruction = "Extract rental clauses."
            categories = ["security_deposit", "refund_condition", "financial_term", "party"]
            max_chunk_chars = 2000
            pass_count = 3
            worker_concurrency = 2

            [[relations]]
            source = "security_deposit"
            target = "refund_condition"
            relation_type = "refunded_under"
            directed = true
            condition = "on vacating"
            "#,
        )
        .unwrap()
    }

    fn clause(category: &str, text: &str, start: usize, chunk: usize, confidence: f64) -> MergedClause {
        MergedClause::new(
            category.to_string(),
            text.to_string(),
            start,
            start + text.len(),
            Attributes::new(),
            1,
            confidence,
            chunk..=chunk,
        )
    }

    #[test]
    fn test_cross_reference_is_unscaled() {
        let schema = schema();
        let config = ExtractorConfig::default();
        let mut deposit = clause("security_deposit", "Deposit Rs. 50,000", 0, 0, 1.0);
        let refund = clause("refund_condition", "refunded within 30 days", 100, 5, 0.5);
        deposit.attributes.insert("refers_to".to_string(), refund.id.to_string());

        let rels = RelationshipInferencer::new(&schema, &config).infer(&[deposit.clone(), refund.clone()]);

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].source_id, deposit.id);
        assert_eq!(rels[0].target_id, refund.id);
        assert_eq!(rels[0].relation_type, "refunded_under");
        assert!((rels[0].strength - 0.75).abs() < 1e-9);
        assert!(rels[0].directed);
    }

    #[test]
    fn test_proximity_only_is_scaled() {
        let schema = schema();
        let config = ExtractorConfig::default();
        let refund = clause("refund_condition", "refunded within 30 days", 100, 1, 1.0);
        let deposit = clause("security_deposit", "Deposit Rs. 50,000", 0, 0, 1.0);

        let rels = RelationshipInferencer::new(&schema, &config).infer(&[deposit.clone(), refund]);

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].source_id, deposit.id);
        assert!((rels[0].strength - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_distant_unreferenced_clauses_are_unrelated() {
        let schema = schema();
        let config = ExtractorConfig::default();
        let deposit = clause("security_deposit", "Deposit Rs. 50,000", 0, 0, 1.0);
        let refund = clause("refund_condition", "refunded within 30 days", 100, 2, 1.0);

        assert!(RelationshipInferencer::new(&schema, &config)
            .infer(&[deposit, refund])
            .is_empty());
    }

    #[test]
    fn test_categories_outside_vocabulary_are_unrelated() {
        let schema = schema();
        let config = ExtractorConfig::default();
        let party = clause("party", "the Tenant", 0, 0, 1.0);
        let term = clause("financial_term", "Rent Rs. 100", 20, 0, 1.0);

        assert!(RelationshipInferencer::new(&schema, &config)
            .infer(&[party, term])
            .is_empty());
    }

    #[test]
    fn test_reference_by_text_and_list_values() {
        let schema = schema();
        let config = ExtractorConfig::default();
        let refund = clause("refund_condition", "refunded within 30 days", 100, 9, 1.0);
        let mut deposit = clause("security_deposit", "Deposit Rs. 50,000", 0, 0, 1.0);
        deposit
            .attributes
            .insert("refers_to".to_string(), "clause 4, refunded within 30 days".to_string());

        let rels = RelationshipInferencer::new(&schema, &config).infer(&[deposit, refund]);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].strength, 1.0);
    }

    #[test]
    fn test_condition_prefers_source_attribute() {
        let schema = schema();
        let config = ExtractorConfig::default();
        let mut deposit = clause("security_deposit", "Deposit Rs. 50,000", 0, 0, 1.0);
        let refund = clause("refund_condition", "refunded within 30 days", 100, 0, 1.0);

        let rels = RelationshipInferencer::new(&schema, &config).infer(&[deposit.clone(), refund.clone()]);
        assert_eq!(rels[0].condition.as_deref(), Some("on vacating"));

        deposit
            .attributes
            .insert("condition".to_string(), "no damage".to_string());
        let rels = RelationshipInferencer::new(&schema, &config).infer(&[deposit, refund]);
        assert_eq!(rels[0].condition.as_deref(), Some("no damage"));
    }

    #[test]
    fn test_no_self_loops_and_sorted_output() {
        let mut schema = schema();
        schema.relations.push(RelationRule {
            source: "financial_term".to_string(),
            target: "financial_term".to_string(),
            relation_type: "amends".to_string(),
            directed: false,
            condition: None,
        });
        let config = ExtractorConfig::default();
        let clauses = vec![
            clause("financial_term", "Rent Rs. 100", 0, 0, 1.0),
            clause("financial_term", "Rent Rs. 100", 0, 0, 1.0),
            clause("financial_term", "Fee Rs. 5", 40, 0, 0.5),
            clause("financial_term", "Levy Rs. 9", 80, 1, 0.5),
        ];

        let rels = RelationshipInferencer::new(&schema, &config).infer(&clauses);

        assert!(rels.iter().all(|r| !r.is_self_loop()));
        assert_eq!(rels.len(), 3);
        let keys: Vec<(ClauseId, ClauseId)> = rels.iter().map(|r| (r.source_id, r.target_id)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_overlap_clause_is_adjacent_to_next_chunk() {
        let schema = schema();
        let config = ExtractorConfig::default();
        let mut deposit = clause("security_deposit", "Deposit Rs. 50,000", 90, 0, 1.0);
        deposit.last_chunk = 1;
        let refund = clause("refund_condition", "refunded within 30 days", 200, 2, 1.0);

        let rels = RelationshipInferencer::new(&schema, &config).infer(&[deposit.clone(), refund.clone()]);

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].source_id, deposit.id);
        assert_eq!(rels[0].target_id, refund.id);
        assert!((rels[0].strength - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_opposite_rules_of_same_type_collapse_to_one_edge() {
        let mut schema = schema();
        schema.relations.push(RelationRule {
            source: "refund_condition".to_string(),
            target: "security_deposit".to_string(),
            relation_type: "refunded_under".to_string(),
            directed: true,
            condition: None,
        });
        let config = ExtractorConfig::default();
        let deposit = clause("security_deposit", "Deposit Rs. 50,000", 0, 0, 1.0);
        let refund = clause("refund_condition", "refunded within 30 days", 100, 0, 0.5);

        let rels = RelationshipInferencer::new(&schema, &config).infer(&[deposit.clone(), refund.clone()]);

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].source_id, deposit.id);
        assert_eq!(rels[0].condition.as_deref(), Some("on vacating"));
        assert!((rels[0].strength - 0.525).abs() < 1e-9);
    }

    #[test]
    fn test_collapse_keeps_strongest_duplicate() {
        let a = clause("security_deposit", "Deposit Rs. 50,000", 0, 0, 1.0);
        let b = clause("refund_condition", "refunded within 30 days", 100, 0, 1.0);
        let weak = Relationship::new(a.id, b.id, "refunded_under", 0.4, None, true);
        let strong = Relationship::new(b.id, a.id, "refunded_under", 0.9, None, true);
        let other = Relationship::new(a.id, b.id, "secures", 0.2, None, false);

        for edges in [
            vec![weak.clone(), strong.clone(), other.clone()],
            vec![strong.clone(), other.clone(), weak.clone()],
        ] {
            let rels = collapse(edges);
            assert_eq!(rels.len(), 2);
            let kept: Vec<_> = rels.iter().filter(|r| r.relation_type == "refunded_under").collect();
            assert_eq!(kept.len(), 1);
            assert_eq!(kept[0].strength, 0.9);
            assert_eq!(kept[0].source_id, b.id);
        }
    }

    #[test]
    fn test_window_zero_requires_same_chunk() {
        let schema = schema();
        let config = ExtractorConfig {
            proximity_window_chunks: 0,
            ..ExtractorConfig::default()
        };
        let deposit = clause("security_deposit", "Deposit Rs. 50,000", 0, 0, 1.0);
        let refund = clause("refund_condition", "refunded within 30 days", 100, 1, 1.0);

        assert!(RelationshipInferencer::new(&schema, &config)
            .infer(&[deposit, refund])
            .is_empty());
    }
}
