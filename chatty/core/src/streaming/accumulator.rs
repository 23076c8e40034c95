//! Response Accumulator

/// Append-only buffer holding everything received for one request
#[derive(Clone, Debug, Default)]
pub struct Accumulator {
    text: String,
    chunks: usize,
}

impl Accumulator {
    /// Create an empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk. Empty chunks are ignored.
    pub fn append(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        self.text.push_str(chunk);
        self.chunks += 1;
    }

    /// Text beyond `offset` (a byte index on a char boundary)
    ///
    /// Returns an empty string when `offset` is at or past the end.
    #[must_use]
    pub fn suffix_from(&self, offset: usize) -> &str {
        self.text.get(offset..).unwrap_or_default()
    }

    /// Everything accumulated so far
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether nothing has been accumulated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of non-empty chunks appended
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Consume the accumulator, returning the text
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}
