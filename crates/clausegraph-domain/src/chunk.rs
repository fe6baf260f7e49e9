//! Chunk module - offset-tracked windows over a source document

/// A contiguous window of the source document
///
/// Offsets are UTF-8 byte offsets into the full document and always fall
/// on char boundaries. Neighbouring chunks may share an overlap region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chunk {
    /// Position of this chunk in document order
    pub index: usize,

    /// Inclusive start offset in the document
    pub start_offset: usize,

    /// Exclusive end offset in the document
    pub end_offset: usize,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(index: usize, start_offset: usize, end_offset: usize) -> Self {
        Self {
            index,
            start_offset,
            end_offset,
        }
    }

    /// Length of the chunk in bytes
    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    /// Whether the chunk covers no text
    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }

    /// Borrow this chunk's text out of the document it was cut from
    ///
    /// Returns `None` if the document is not the one the chunk was built on.
    pub fn text<'a>(&self, document: &'a str) -> Option<&'a str> {
        document.get(self.start_offset..self.end_offset)
    }

    /// Whether the global span `[start, end)` lies entirely inside this chunk
    pub fn contains_span(&self, start: usize, end: usize) -> bool {
        self.start_offset <= start && end <= self.end_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_slices_document() {
        let doc = "Monthly rent: Rs. 25,000/-";
        let chunk = Chunk::new(0, 14, 26);
        assert_eq!(chunk.text(doc), Some("Rs. 25,000/-"));
        assert_eq!(chunk.len(), 12);
    }

    #[test]
    fn test_chunk_text_out_of_range() {
        let chunk = Chunk::new(0, 0, 100);
        assert_eq!(chunk.text("short"), None);
    }

    #[test]
    fn test_contains_span() {
        let chunk = Chunk::new(1, 10, 20);
        assert!(chunk.contains_span(10, 20));
        assert!(chunk.contains_span(12, 15));
        assert!(!chunk.contains_span(9, 15));
        assert!(!chunk.contains_span(15, 21));
    }
}
