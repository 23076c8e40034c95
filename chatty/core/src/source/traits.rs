//! Chunk Source Trait
//!
//! A source hands out one read result at a time. The last piece of data and
//! the end-of-stream signal may arrive in the same result.

use async_trait::async_trait;

use crate::error::StreamError;

/// Outcome of a single pull from a [`ChunkSource`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadResult {
    /// Text delivered by this pull. Always present when `done` is false.
    pub value: Option<String>,
    /// Whether the stream has finished
    pub done: bool,
}

impl ReadResult {
    /// A chunk with more to come
    pub fn chunk(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            done: false,
        }
    }

    /// The final chunk, delivered together with completion
    pub fn last(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            done: true,
        }
    }

    /// Completion with no data attached
    #[must_use]
    pub fn finished() -> Self {
        Self {
            value: None,
            done: true,
        }
    }
}

/// Pull interface over a decoded text stream
///
/// Implementations must never return `done == false` without a value.
/// Transport or decoding failures surface as `Err`.
#[async_trait]
pub trait ChunkSource: Send {
    /// Pull the next result
    async fn read(&mut self) -> Result<ReadResult, StreamError>;
}

#[async_trait]
impl<S: ChunkSource + ?Sized> ChunkSource for Box<S> {
    async fn read(&mut self) -> Result<ReadResult, StreamError> {
        (**self).read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_result_constructors() {
        assert_eq!(
            ReadResult::chunk("a"),
            ReadResult {
                value: Some("a".into()),
                done: false
            }
        );
        assert!(ReadResult::last("z").done);
        assert_eq!(ReadResult::finished().value, None);
        assert!(!ReadResult::default().done);
    }
}
