//! Byte Stream Source
//!
//! Adapts a stream of raw byte chunks (such as `reqwest::Response::bytes_stream()`)
//! into a [`ChunkSource`]. Multi-byte characters split across network chunks
//! are carried over to the next read. When the end of the stream is already
//! known at the time a chunk is handed out, the chunk is delivered bundled
//! with `done = true`.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::FutureExt;
use futures::stream::{BoxStream, Stream, StreamExt};

use super::traits::{ChunkSource, ReadResult};
use crate::error::{BoxError, StreamError};

/// Chunk source over an HTTP (or any) byte stream
pub struct ByteStreamSource {
    stream: BoxStream<'static, Result<Vec<u8>, StreamError>>,
    /// Trailing bytes of an incomplete UTF-8 sequence
    carry: Vec<u8>,
    /// Item pulled during lookahead, not yet decoded
    pending: Option<Result<Vec<u8>, StreamError>>,
    /// Decoding failure held back until the text before it was handed out
    deferred: Option<StreamError>,
    /// Longest wait for the next item; only counted while a read is waiting
    idle_timeout: Option<Duration>,
    finished: bool,
}

impl ByteStreamSource {
    /// Wrap a byte chunk stream
    pub fn new<S, B, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]>,
        E: Into<BoxError>,
    {
        let stream = stream
            .map(|item| {
                item.map(|bytes| bytes.as_ref().to_vec())
                    .map_err(StreamError::transport)
            })
            .boxed();

        Self {
            stream,
            carry: Vec::new(),
            pending: None,
            deferred: None,
            idle_timeout: None,
            finished: false,
        }
    }

    /// Fail a read that waits longer than `limit` for the next chunk
    ///
    /// Time spent between reads (while the consumer reveals) does not count.
    #[must_use]
    pub fn with_idle_timeout(mut self, limit: Duration) -> Self {
        self.idle_timeout = Some(limit);
        self
    }

    async fn next_item(&mut self) -> Result<Option<Result<Vec<u8>, StreamError>>, StreamError> {
        let Some(limit) = self.idle_timeout else {
            return Ok(self.stream.next().await);
        };
        tokio::time::timeout(limit, self.stream.next())
            .await
            .map_err(|_| StreamError::transport(format!("no data received for {limit:?}")))
    }

    /// Decode as much of `carry + bytes` as forms complete characters
    ///
    /// Text before an invalid sequence is still returned, alongside the error.
    fn decode(&mut self, bytes: &[u8]) -> (String, Option<StreamError>) {
        self.carry.extend_from_slice(bytes);

        let (valid, failure) = match std::str::from_utf8(&self.carry) {
            Ok(_) => (self.carry.len(), None),
            Err(e) if e.error_len().is_some() => (
                e.valid_up_to(),
                Some(StreamError::Malformed(format!(
                    "invalid UTF-8 sequence after {} valid bytes",
                    e.valid_up_to()
                ))),
            ),
            // Incomplete sequence at the tail: keep it for the next chunk
            Err(e) => (e.valid_up_to(), None),
        };

        let rest = self.carry.split_off(valid);
        let complete = std::mem::replace(&mut self.carry, rest);
        if failure.is_some() {
            self.carry.clear();
        }

        match String::from_utf8(complete) {
            Ok(text) => (text, failure),
            Err(e) => (String::new(), Some(StreamError::Malformed(e.to_string()))),
        }
    }

    fn finish(&mut self) -> Option<StreamError> {
        self.finished = true;
        if self.carry.is_empty() {
            return None;
        }
        let dangling = self.carry.len();
        self.carry.clear();
        Some(StreamError::Malformed(format!(
            "stream ended inside a multi-byte character ({dangling} dangling bytes)"
        )))
    }

    /// Hand out `text` now and report `err` on the next read
    fn fail_after(&mut self, text: String, err: StreamError) -> Result<ReadResult, StreamError> {
        self.finished = true;
        if text.is_empty() {
            return Err(err);
        }
        self.deferred = Some(err);
        Ok(ReadResult::chunk(text))
    }
}

#[async_trait]
impl ChunkSource for ByteStreamSource {
    async fn read(&mut self) -> Result<ReadResult, StreamError> {
        if let Some(err) = self.deferred.take() {
            return Err(err);
        }
        if self.finished {
            return Ok(ReadResult::finished());
        }

        let item = match self.pending.take() {
            Some(item) => Some(item),
            None => self.next_item().await?,
        };

        let Some(item) = item else {
            return match self.finish() {
                Some(err) => Err(err),
                None => Ok(ReadResult::finished()),
            };
        };

        let (text, failure) = self.decode(&item?);
        if let Some(err) = failure {
            return self.fail_after(text, err);
        }

        // Peek without waiting: only bundle completion if it is already known.
        match self.stream.next().now_or_never() {
            Some(None) => match self.finish() {
                Some(err) => self.fail_after(text, err),
                None => Ok(ReadResult::last(text)),
            },
            Some(Some(next)) => {
                self.pending = Some(next);
                Ok(ReadResult::chunk(text))
            }
            None => Ok(ReadResult::chunk(text)),
        }
    }
}
