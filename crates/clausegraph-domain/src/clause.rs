//! Clause module - candidates, grounded clauses and merged clauses

use crate::Chunk;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Category-specific attributes attached to a clause
///
/// A `BTreeMap` keeps iteration (and therefore serialization) order stable.
pub type Attributes = BTreeMap<String, String>;

/// Namespace for deriving clause ids (UUIDv5)
const CLAUSE_ID_NAMESPACE: uuid::Uuid = uuid::Uuid::from_u128(0x6c1a_0b5e_4f3d_5a7e_9c2b_1d8e_3f40_a915);

/// Stable identifier of a merged clause
///
/// Derived from the clause category and its canonical span, so the same
/// clause extracted from the same document always gets the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseId(u128);

impl ClauseId {
    /// Derive the id for a clause of `category` spanning `[start, end)`
    ///
    /// # Examples
    ///
    /// ```
    /// use clausegraph_domain::ClauseId;
    ///
    /// let a = ClauseId::derive("financial_term", 14, 26);
    /// let b = ClauseId::derive("financial_term", 14, 26);
    /// assert_eq!(a, b);
    /// assert_ne!(a, ClauseId::derive("security_deposit", 14, 26));
    /// ```
    pub fn derive(category: &str, start: usize, end: usize) -> Self {
        let name = format!("{}:{}:{}", category, start, end);
        Self(uuid::Uuid::new_v5(&CLAUSE_ID_NAMESPACE, name.as_bytes()).as_u128())
    }

    /// Parse a ClauseId from its hyphenated UUID string form
    ///
    /// # Examples
    ///
    /// ```
    /// use clausegraph_domain::ClauseId;
    ///
    /// let id = ClauseId::derive("party", 0, 5);
    /// let parsed = ClauseId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid clause id: {}", e))
    }
}

impl fmt::Display for ClauseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// One model-proposed extraction, before any verification
///
/// Offsets are local to the chunk the candidate was extracted from.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseCandidate {
    /// Clause category label (e.g. "financial_term")
    pub category: String,

    /// Extracted text, expected to be an exact substring of the chunk
    pub text: String,

    /// Start byte offset within the chunk
    pub local_start: usize,

    /// End byte offset (exclusive) within the chunk
    pub local_end: usize,

    /// Pass that produced this candidate (stamped by the orchestrator)
    pub pass: usize,

    /// Category-specific attributes
    pub attributes: Attributes,
}

impl ClauseCandidate {
    /// Create a candidate with no attributes, attributed to pass 0
    pub fn new(
        category: impl Into<String>,
        text: impl Into<String>,
        local_start: usize,
        local_end: usize,
    ) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
            local_start,
            local_end,
            pass: 0,
            attributes: Attributes::new(),
        }
    }

    /// Attach an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Why a candidate could not be grounded in the source document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroundingMismatch {
    /// Candidate text is empty
    #[error("candidate text is empty")]
    EmptyText,

    /// End offset precedes start offset
    #[error("inverted span {start}..{end}")]
    InvertedSpan {
        /// Local start offset
        start: usize,
        /// Local end offset
        end: usize,
    },

    /// Span reaches outside the chunk it was extracted from
    #[error("span {start}..{end} lies outside chunk {chunk_start}..{chunk_end}")]
    OutsideChunk {
        /// Global start offset
        start: usize,
        /// Global end offset
        end: usize,
        /// Chunk start offset
        chunk_start: usize,
        /// Chunk end offset
        chunk_end: usize,
    },

    /// Span does not fall on char boundaries of the document
    #[error("span {start}..{end} is not on char boundaries")]
    NotCharBoundary {
        /// Global start offset
        start: usize,
        /// Global end offset
        end: usize,
    },

    /// Document text at the span differs from the candidate text
    #[error("text at {start}..{end} is {found:?}, candidate claims {claimed:?}")]
    TextMismatch {
        /// Global start offset
        start: usize,
        /// Global end offset
        end: usize,
        /// Text actually present in the document
        found: String,
        /// Text the candidate claimed
        claimed: String,
    },
}

/// A candidate verified against the source document
///
/// The only constructor is [`GroundedClause::try_ground`], so for every
/// value `document[start_offset..end_offset] == text` holds.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundedClause {
    category: String,
    text: String,
    start_offset: usize,
    end_offset: usize,
    attributes: Attributes,
    chunk_index: usize,
    pass: usize,
}

impl GroundedClause {
    /// Resolve a candidate's local span to global offsets and verify it
    ///
    /// The global span is `chunk.start_offset + local`. The document slice
    /// at that span must equal the candidate text byte for byte: no
    /// trimming, no case folding, no whitespace normalization.
    pub fn try_ground(
        document: &str,
        candidate: &ClauseCandidate,
        chunk: &Chunk,
    ) -> Result<Self, GroundingMismatch> {
        if candidate.text.is_empty() {
            return Err(GroundingMismatch::EmptyText);
        }
        if candidate.local_end < candidate.local_start {
            return Err(GroundingMismatch::InvertedSpan {
                start: candidate.local_start,
                end: candidate.local_end,
            });
        }

        let start = chunk.start_offset.saturating_add(candidate.local_start);
        let end = chunk.start_offset.saturating_add(candidate.local_end);
        if !chunk.contains_span(start, end) {
            return Err(GroundingMismatch::OutsideChunk {
                start,
                end,
                chunk_start: chunk.start_offset,
                chunk_end: chunk.end_offset,
            });
        }

        let found = document
            .get(start..end)
            .ok_or(GroundingMismatch::NotCharBoundary { start, end })?;
        if found != candidate.text {
            return Err(GroundingMismatch::TextMismatch {
                start,
                end,
                found: found.to_string(),
                claimed: candidate.text.clone(),
            });
        }

        Ok(Self {
            category: candidate.category.clone(),
            text: candidate.text.clone(),
            start_offset: start,
            end_offset: end,
            attributes: candidate.attributes.clone(),
            chunk_index: chunk.index,
            pass: candidate.pass,
        })
    }

    /// Clause category
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Verified clause text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Global start offset
    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    /// Global end offset (exclusive)
    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    /// Span length in bytes (never zero)
    pub fn span_len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    /// Attributes offered by the candidate
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Index of the chunk the candidate came from
    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    /// Pass that produced the candidate
    pub fn pass(&self) -> usize {
        self.pass
    }
}

/// The canonical clause agreed on across passes and chunks
#[derive(Debug, Clone, PartialEq)]
pub struct MergedClause {
    /// Stable id derived from category and canonical span
    pub id: ClauseId,

    /// Clause category
    pub category: String,

    /// Canonical text, equal to `document[start_offset..end_offset]`
    pub text: String,

    /// Global start offset of the canonical span
    pub start_offset: usize,

    /// Global end offset of the canonical span
    pub end_offset: usize,

    /// Attributes reconciled by plurality vote
    pub attributes: Attributes,

    /// Number of distinct passes whose candidates fell in this cluster
    pub support_count: usize,

    /// Agreement-based confidence in [0.0, 1.0]
    pub confidence: f64,

    /// First chunk that contains the canonical span
    pub first_chunk: usize,

    /// Last chunk that contains the canonical span
    pub last_chunk: usize,
}

impl MergedClause {
    /// Create a merged clause, deriving its id from category and span
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        category: String,
        text: String,
        start_offset: usize,
        end_offset: usize,
        attributes: Attributes,
        support_count: usize,
        confidence: f64,
        chunks: RangeInclusive<usize>,
    ) -> Self {
        let (first_chunk, last_chunk) = chunks.into_inner();
        Self {
            id: ClauseId::derive(&category, start_offset, end_offset),
            category,
            text,
            start_offset,
            end_offset,
            attributes,
            support_count,
            confidence: confidence.clamp(0.0, 1.0),
            first_chunk,
            last_chunk: last_chunk.max(first_chunk),
        }
    }

    /// Document order: start offset, then category, then end offset
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        (self.start_offset, &self.category, self.end_offset).cmp(&(
            other.start_offset,
            &other.category,
            other.end_offset,
        ))
    }

    /// Number of chunks separating the two clauses, 0 when a chunk holds both
    pub fn chunk_distance(&self, other: &Self) -> usize {
        if self.last_chunk < other.first_chunk {
            other.first_chunk - self.last_chunk
        } else if other.last_chunk < self.first_chunk {
            self.first_chunk - other.last_chunk
        } else {
            0
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every successfully grounded clause matches the document at its span
        #[test]
        fn test_grounding_invariant(
            doc in "[a-zA-Z ,.]{1,80}",
            chunk_start in 0usize..40,
            local_start in 0usize..40,
            len in 1usize..20,
        ) {
            let chunk_start = chunk_start.min(doc.len());
            let chunk = Chunk::new(0, chunk_start, doc.len());
            let global_start = chunk_start + local_start;
            let claimed = doc.get(global_start..(global_start + len).min(doc.len()))
                .unwrap_or("zz")
                .to_string();
            let candidate = ClauseCandidate::new("term", claimed, local_start, local_start + len);

            if let Ok(g) = GroundedClause::try_ground(&doc, &candidate, &chunk) {
                prop_assert_eq!(&doc[g.start_offset()..g.end_offset()], g.text());
            }
        }
    }
}
