//! Reveal Scheduler
//!
//! Replays the unrevealed part of the buffer one character at a time,
//! pausing for the pacing interval after each emission.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::accumulator::Accumulator;
use super::sink::RevealSink;
use super::timer::{RevealTimer, TokioTimer};
use crate::config::RevealConfig;
use crate::error::StreamError;

/// Paces growing prefixes of a string to a sink
#[derive(Clone)]
pub struct RevealScheduler {
    interval: Duration,
    timer: Arc<dyn RevealTimer>,
}

impl std::fmt::Debug for RevealScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealScheduler")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl Default for RevealScheduler {
    fn default() -> Self {
        Self::from_config(&RevealConfig::default())
    }
}

impl RevealScheduler {
    /// Scheduler using the tokio timer
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self::with_timer(interval, Arc::new(TokioTimer))
    }

    /// Scheduler with an injected timer
    #[must_use]
    pub fn with_timer(interval: Duration, timer: Arc<dyn RevealTimer>) -> Self {
        Self { interval, timer }
    }

    /// Scheduler configured from `[reveal]`
    #[must_use]
    pub fn from_config(config: &RevealConfig) -> Self {
        Self::new(config.interval())
    }

    /// Delay between successive reveals
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Reveal the buffer past `*offset` one character at a time
    ///
    /// Each step sends the buffer up to and including the next character,
    /// advances `*offset` past it, then waits one interval. `*offset` must
    /// sit on a char boundary. The cancellation token is checked before
    /// every reveal and races every pause. Returns the number of reveals
    /// issued.
    pub async fn reveal<S>(
        &self,
        buffer: &Accumulator,
        offset: &mut usize,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<usize, StreamError>
    where
        S: RevealSink + ?Sized,
    {
        let text = buffer.as_str();
        let mut reveals = 0;
        for ch in buffer.suffix_from(*offset).chars() {
            if cancel.is_cancelled() {
                return Err(StreamError::Cancelled);
            }

            let end = *offset + ch.len_utf8();
            sink.partial_update(&text[..end])
                .await
                .map_err(StreamError::sink)?;
            *offset = end;
            reveals += 1;
            trace!(offset = end, "Revealed prefix");

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(StreamError::Cancelled),
                () = self.timer.pause(self.interval) => {}
            }
        }

        Ok(reveals)
    }
}
