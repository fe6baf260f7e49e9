//! Candidate merging: cluster grounded clauses and score agreement
//!
//! Clauses of the same category cluster together when their spans overlap
//! by more than half of the shorter span (transitively). Each cluster
//! becomes one [`MergedClause`]:
//!
//! - canonical span: the exact span most members agree on, ties going to
//!   the span seen first (earliest chunk, then earliest pass)
//! - attributes: per key, the plurality value, ties going to first seen
//! - support: distinct chunk × pass contributors in the cluster
//! - confidence: support / passes attempted over the chunks containing
//!   the canonical span, capped at 1.0
//!
//! The result depends only on the set of grounded clauses, never on the
//! order they arrive in.

use clausegraph_domain::{Attributes, Chunk, GroundedClause, MergedClause};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Merge grounded clauses into canonical clauses
///
/// `passes_per_chunk` is the number of passes scheduled for every chunk,
/// including passes that failed.
pub fn merge(
    grounded: &[GroundedClause],
    chunks: &[Chunk],
    passes_per_chunk: usize,
) -> Vec<MergedClause> {
    let mut ordered: Vec<&GroundedClause> = grounded.iter().collect();
    ordered.sort_by(|a, b| first_seen_key(a).cmp(&first_seen_key(b)));

    let mut by_category: BTreeMap<&str, Vec<&GroundedClause>> = BTreeMap::new();
    for clause in ordered {
        by_category.entry(clause.category()).or_default().push(clause);
    }

    let mut merged = Vec::new();
    for (category, members) in by_category {
        let clusters = cluster(&members);
        debug!(category, candidates = members.len(), clusters = clusters.len(), "Clustered candidates");
        for cluster in clusters {
            merged.push(merge_cluster(&cluster, chunks, passes_per_chunk));
        }
    }

    merged.sort_by(MergedClause::cmp_position);
    merged
}

/// Order in which a clause counts as "seen"
fn first_seen_key(clause: &GroundedClause) -> (usize, usize, usize, usize, &str) {
    (
        clause.chunk_index(),
        clause.pass(),
        clause.start_offset(),
        clause.end_offset(),
        clause.category(),
    )
}

/// Whether two spans overlap by more than half of the shorter one
fn spans_merge(a: &GroundedClause, b: &GroundedClause) -> bool {
    let overlap_start = a.start_offset().max(b.start_offset());
    let overlap_end = a.end_offset().min(b.end_offset());
    if overlap_end <= overlap_start {
        return false;
    }
    let overlap = overlap_end - overlap_start;
    let shorter = a.span_len().min(b.span_len());
    overlap * 2 > shorter
}

/// Group same-category members into connected components of `spans_merge`
///
/// Members arrive in first-seen order and each cluster keeps that order.
/// Clusters are returned ordered by their first member.
fn cluster<'a>(members: &[&'a GroundedClause]) -> Vec<Vec<&'a GroundedClause>> {
    let mut parent: Vec<usize> = (0..members.len()).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            if spans_merge(members[i], members[j]) {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    // Lower index stays root so clusters are keyed by first member
                    let (root, child) = if ri < rj { (ri, rj) } else { (rj, ri) };
                    parent[child] = root;
                }
            }
        }
    }

    let mut groups: BTreeMap<usize, Vec<&'a GroundedClause>> = BTreeMap::new();
    for (i, member) in members.iter().enumerate() {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(member);
    }
    groups.into_values().collect()
}

fn merge_cluster(cluster: &[&GroundedClause], chunks: &[Chunk], passes_per_chunk: usize) -> MergedClause {
    // Exact spans: (count, first-seen position); members are in first-seen order
    let mut spans: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
    for (pos, member) in cluster.iter().enumerate() {
        let entry = spans
            .entry((member.start_offset(), member.end_offset()))
            .or_insert((0, pos));
        entry.0 += 1;
    }
    let (_, &(_, canonical_pos)) = spans
        .iter()
        .max_by(|(_, (count_a, pos_a)), (_, (count_b, pos_b))| {
            count_a.cmp(count_b).then(pos_b.cmp(pos_a))
        })
        .unwrap_or((&(0, 0), &(0, 0)));
    let canonical = cluster[canonical_pos];

    let support_count = cluster
        .iter()
        .map(|m| (m.chunk_index(), m.pass()))
        .collect::<BTreeSet<_>>()
        .len();

    let start = canonical.start_offset();
    let end = canonical.end_offset();
    let covering: Vec<&Chunk> = chunks.iter().filter(|c| c.contains_span(start, end)).collect();
    let passes_attempted = (covering.len() * passes_per_chunk).max(1);
    let confidence = (support_count as f64 / passes_attempted as f64).min(1.0);
    let covering_chunks = match (covering.first(), covering.last()) {
        (Some(first), Some(last)) => first.index..=last.index,
        _ => canonical.chunk_index()..=canonical.chunk_index(),
    };

    MergedClause::new(
        canonical.category().to_string(),
        canonical.text().to_string(),
        start,
        end,
        reconcile_attributes(cluster),
        support_count,
        confidence,
        covering_chunks,
    )
}

/// Plurality vote per attribute key, ties broken by first-seen value
fn reconcile_attributes(cluster: &[&GroundedClause]) -> Attributes {
    let keys: BTreeSet<&str> = cluster
        .iter()
        .flat_map(|m| m.attributes().keys().map(String::as_str))
        .collect();

    let mut reconciled = Attributes::new();
    for key in keys {
        // value -> (count, first-seen position)
        let mut votes: HashMap<&str, (usize, usize)> = HashMap::new();
        for (pos, member) in cluster.iter().enumerate() {
            if let Some(value) = member.attributes().get(key) {
                votes.entry(value.as_str()).or_insert((0, pos)).0 += 1;
            }
        }
        let winner = votes
            .into_iter()
            .max_by(|(_, (count_a, pos_a)), (_, (count_b, pos_b))| {
                count_a.cmp(count_b).then(pos_b.cmp(pos_a))
            })
            .map(|(value, _)| value);
        if let Some(value) = winner {
            reconciled.insert(key.to_string(), value.to_string());
        }
    }
    reconciled
}
