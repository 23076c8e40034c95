//! Reveal Sink
//!
//! The display side of a request. A sink receives growing prefixes of the
//! response and, once everything has been shown, a single end notification.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Consumer of revealed text
///
/// Both callbacks are awaited before the consumer loop proceeds, so at most
/// one call per request is ever in flight.
#[async_trait]
pub trait RevealSink: Send {
    /// Show `text`, the revealed prefix of the response so far
    async fn partial_update(&mut self, text: &str) -> anyhow::Result<()>;

    /// All text has been revealed. Called exactly once per completed request.
    async fn end_of_stream(&mut self) -> anyhow::Result<()>;
}

/// Notification forwarded by a [`ChannelSink`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevealEvent {
    /// A new revealed prefix
    Partial(String),
    /// The response is complete
    End,
}

/// Sink that forwards notifications over an mpsc channel
///
/// Useful for surfaces that render on their own task. A closed receiver is
/// reported as a sink failure.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<RevealEvent>,
}

impl ChannelSink {
    /// Create a sink from a sender
    pub fn new(tx: mpsc::Sender<RevealEvent>) -> Self {
        Self { tx }
    }

    /// Create a connected sink/receiver pair
    #[must_use]
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<RevealEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl RevealSink for ChannelSink {
    async fn partial_update(&mut self, text: &str) -> anyhow::Result<()> {
        self.tx
            .send(RevealEvent::Partial(text.to_string()))
            .await
            .map_err(|_| anyhow::anyhow!("reveal receiver closed"))
    }

    async fn end_of_stream(&mut self) -> anyhow::Result<()> {
        self.tx
            .send(RevealEvent::End)
            .await
            .map_err(|_| anyhow::anyhow!("reveal receiver closed"))
    }
}
