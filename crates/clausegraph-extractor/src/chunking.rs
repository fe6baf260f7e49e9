//! Text chunking for large documents
//!
//! Splits a document into overlapping, offset-tracked chunks. Boundaries
//! prefer natural breaks near the size limit and fall back to a hard split.

use clausegraph_domain::Chunk;

/// Natural break points, strongest first. A chunk ends right after the
/// separator, so the separator stays with the text it terminates.
const BOUNDARY_TIERS: &[&[&str]] = &[
    &["\n\n"],
    &[". ", "! ", "? ", ".\n", "!\n", "?\n", ";\n", "; "],
    &["\n"],
    &[" ", "\t"],
];

/// Default fraction of the chunk size searched for a natural break
pub const DEFAULT_SLACK_RATIO: f64 = 0.2;

/// Splits text into overlapping chunks
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_chunk_size: usize,
    overlap: usize,
    slack: usize,
}

impl TextChunker {
    /// Create a new text chunker
    ///
    /// `overlap` must be smaller than half of `max_chunk_size`; document
    /// type validation guarantees this for configured chunkers.
    pub fn new(max_chunk_size: usize, overlap: usize) -> Self {
        let max_chunk_size = max_chunk_size.max(1);
        Self {
            max_chunk_size,
            overlap: overlap.min(max_chunk_size / 2),
            slack: slack_for(max_chunk_size, DEFAULT_SLACK_RATIO),
        }
    }

    /// Search `ratio` of the chunk size backwards from the limit for a break
    pub fn with_slack_ratio(mut self, ratio: f64) -> Self {
        self.slack = slack_for(self.max_chunk_size, ratio);
        self
    }

    /// Chunk the given text
    ///
    /// Deterministic: the same text and settings always give the same
    /// boundaries. Text no longer than the limit yields a single chunk.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let len = text.len();
        if len <= self.max_chunk_size {
            return vec![Chunk::new(0, 0, len)];
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            if len - start <= self.max_chunk_size {
                chunks.push(Chunk::new(chunks.len(), start, len));
                break;
            }

            let end = self.find_boundary(text, start);
            chunks.push(Chunk::new(chunks.len(), start, end));

            let next = floor_char_boundary(text, end.saturating_sub(self.overlap));
            start = if next > start { next } else { end };
        }

        chunks
    }

    /// Pick the end of a chunk starting at `start`
    fn find_boundary(&self, text: &str, start: usize) -> usize {
        let hard = floor_char_boundary(text, start + self.max_chunk_size);
        if hard <= start {
            // Limit is smaller than the character at `start`
            return ceil_char_boundary(text, start + 1);
        }

        let window_start = ceil_char_boundary(text, hard.saturating_sub(self.slack).max(start + 1));
        if window_start >= hard {
            return hard;
        }
        let window = &text[window_start..hard];

        for tier in BOUNDARY_TIERS {
            let best = tier
                .iter()
                .filter_map(|sep| window.rfind(sep).map(|pos| pos + sep.len()))
                .max();
            if let Some(pos) = best {
                return window_start + pos;
            }
        }

        hard
    }
}

/// Split `text` into chunks of at most `max_chars` bytes sharing `overlap_chars`
pub fn split(text: &str, max_chars: usize, overlap_chars: usize) -> Vec<Chunk> {
    TextChunker::new(max_chars, overlap_chars).chunk(text)
}

fn slack_for(max_chunk_size: usize, ratio: f64) -> usize {
    ((max_chunk_size as f64 * ratio.clamp(0.0, 0.5)) as usize).max(1)
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}
