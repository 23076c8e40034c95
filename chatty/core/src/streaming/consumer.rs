//! Stream Consumer Loop
//!
//! Drives one request from first read to end notification.
//!
//! # State Machine
//!
//! ```text
//!            read() → value?  append + reveal
//!          ┌──────────┐
//!          ▼          │ done == false
//!     ┌─────────┐ ────┘
//!     │ Reading │
//!     └────┬────┘
//!          │ done == true (value, if any, already appended)
//!          ▼
//!     ┌──────────┐  final reveal pass, no more reads
//!     │ Flushing │
//!     └────┬─────┘
//!          │ offset == len → end_of_stream() once
//!          ▼
//!     ┌───────────┐
//!     │ Completed │
//!     └───────────┘
//! ```
//!
//! Any failure (read, sink, cancellation) leaves the loop before
//! `Completed`, so the end notification is never sent for a failed request.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::accumulator::Accumulator;
use super::scheduler::RevealScheduler;
use super::sink::RevealSink;
use crate::config::RevealConfig;
use crate::error::StreamError;
use crate::source::{ChunkSource, ReadResult};

/// Phase of a reveal request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamState {
    /// Pulling chunks from the source
    #[default]
    Reading,
    /// Source finished; revealing whatever is left
    Flushing,
    /// Everything revealed and the end notification sent
    Completed,
}

/// Request-scoped state: the buffer, how much of it the sink has seen, and
/// the current phase
#[derive(Debug, Default)]
pub struct RevealState {
    accumulator: Accumulator,
    offset: usize,
    state: StreamState,
    reveals: usize,
}

impl RevealState {
    /// Fresh state for a new request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated text
    #[must_use]
    pub fn text(&self) -> &str {
        self.accumulator.as_str()
    }

    /// Bytes of the text already handed to the sink
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Current phase
    #[must_use]
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Whether text remains that the sink has not seen
    #[must_use]
    pub fn has_unrevealed(&self) -> bool {
        self.offset < self.accumulator.len()
    }

    fn transition(&mut self, next: StreamState) {
        debug!(
            from = ?self.state,
            to = ?next,
            offset = self.offset,
            len = self.accumulator.len(),
            "Stream state transition"
        );
        self.state = next;
    }

    fn into_report(self, request_id: Uuid) -> RevealReport {
        RevealReport {
            request_id,
            chunks: self.accumulator.chunk_count(),
            reveals: self.reveals,
            final_state: self.state,
            text: self.accumulator.into_string(),
        }
    }
}

/// Summary of a completed request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealReport {
    /// Identifier used in log spans for this request
    pub request_id: Uuid,
    /// The full response text
    pub text: String,
    /// Number of partial updates sent
    pub reveals: usize,
    /// Number of non-empty chunks received
    pub chunks: usize,
    /// Phase the request ended in (always `Completed` for a returned report)
    pub final_state: StreamState,
}

/// Consumes a chunk source and reveals it to a sink, one request at a time
#[derive(Clone, Debug, Default)]
pub struct StreamConsumerLoop {
    scheduler: RevealScheduler,
}

impl StreamConsumerLoop {
    /// Create a loop around a scheduler
    #[must_use]
    pub fn new(scheduler: RevealScheduler) -> Self {
        Self { scheduler }
    }

    /// Create a loop from `[reveal]` configuration
    #[must_use]
    pub fn from_config(config: &RevealConfig) -> Self {
        Self::new(RevealScheduler::from_config(config))
    }

    /// The pacing scheduler
    #[must_use]
    pub fn scheduler(&self) -> &RevealScheduler {
        &self.scheduler
    }

    /// Run one request to completion
    ///
    /// On success every character has been revealed in order and
    /// `end_of_stream` was called exactly once. On failure the error is
    /// returned as-is; partial updates already delivered stay delivered and
    /// `end_of_stream` is not called.
    pub async fn run<C, S>(
        &self,
        source: &mut C,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<RevealReport, StreamError>
    where
        C: ChunkSource + ?Sized,
        S: RevealSink + ?Sized,
    {
        let request_id = Uuid::new_v4();
        let span = info_span!("reveal_request", request_id = %request_id);

        async move {
            info!(interval = ?self.scheduler.interval(), "Reveal request started");
            let result = self.drive(source, sink, cancel).await;
            match &result {
                Ok(state) => info!(
                    chars = state.text().chars().count(),
                    reveals = state.reveals,
                    "Reveal request completed"
                ),
                Err(StreamError::Cancelled) => info!("Reveal request cancelled"),
                Err(e) => warn!(error = %e, "Reveal request failed"),
            }
            result.map(|state| state.into_report(request_id))
        }
        .instrument(span)
        .await
    }

    async fn drive<C, S>(
        &self,
        source: &mut C,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<RevealState, StreamError>
    where
        C: ChunkSource + ?Sized,
        S: RevealSink + ?Sized,
    {
        let mut state = RevealState::new();

        loop {
            match state.state {
                StreamState::Reading => {
                    if cancel.is_cancelled() {
                        return Err(StreamError::Cancelled);
                    }

                    let result = tokio::select! {
                        biased;
                        () = cancel.cancelled() => Err(StreamError::Cancelled),
                        result = source.read() => result,
                    };
                    let ReadResult { value, done } = result?;

                    if let Some(chunk) = value {
                        debug!(bytes = chunk.len(), done, "Chunk received");
                        state.accumulator.append(&chunk);
                        self.reveal_pending(&mut state, sink, cancel).await?;
                    }

                    if done {
                        state.transition(StreamState::Flushing);
                    }
                }
                StreamState::Flushing => {
                    self.reveal_pending(&mut state, sink, cancel).await?;

                    if !state.has_unrevealed() {
                        sink.end_of_stream().await.map_err(StreamError::sink)?;
                        state.transition(StreamState::Completed);
                    }
                }
                StreamState::Completed => return Ok(state),
            }
        }
    }

    async fn reveal_pending<S>(
        &self,
        state: &mut RevealState,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<(), StreamError>
    where
        S: RevealSink + ?Sized,
    {
        let revealed = self
            .scheduler
            .reveal(&state.accumulator, &mut state.offset, sink, cancel)
            .await?;
        state.reveals += revealed;
        Ok(())
    }
}
