//! Channel Source
//!
//! A [`ChunkSource`] fed by a tokio mpsc channel. Closing the sending side
//! ends the stream; an `Err` item fails the read that receives it.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use super::traits::{ChunkSource, ReadResult};
use crate::error::StreamError;

/// Chunk source over an mpsc receiver of text chunks
pub struct ChannelSource {
    receiver: mpsc::Receiver<Result<String, StreamError>>,
    pending: Option<Result<String, StreamError>>,
    finished: bool,
}

impl ChannelSource {
    /// Create a source from a receiver
    pub fn new(receiver: mpsc::Receiver<Result<String, StreamError>>) -> Self {
        Self {
            receiver,
            pending: None,
            finished: false,
        }
    }

    /// Create a connected sender/source pair
    #[must_use]
    pub fn channel(buffer: usize) -> (mpsc::Sender<Result<String, StreamError>>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl ChunkSource for ChannelSource {
    async fn read(&mut self) -> Result<ReadResult, StreamError> {
        if self.finished {
            return Ok(ReadResult::finished());
        }

        let item = match self.pending.take() {
            Some(item) => Some(item),
            None => self.receiver.recv().await,
        };

        let Some(item) = item else {
            self.finished = true;
            return Ok(ReadResult::finished());
        };
        let text = item?;

        match self.receiver.try_recv() {
            Ok(next) => {
                self.pending = Some(next);
                Ok(ReadResult::chunk(text))
            }
            Err(TryRecvError::Disconnected) => {
                self.finished = true;
                Ok(ReadResult::last(text))
            }
            Err(TryRecvError::Empty) => Ok(ReadResult::chunk(text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_closed_channel_bundles_last_chunk() {
        let (tx, mut source) = ChannelSource::channel(8);
        tx.send(Ok("h".into())).await.unwrap();
        tx.send(Ok("i".into())).await.unwrap();
        drop(tx);

        assert_eq!(source.read().await.unwrap(), ReadResult::chunk("h"));
        assert_eq!(source.read().await.unwrap(), ReadResult::last("i"));
        assert_eq!(source.read().await.unwrap(), ReadResult::finished());
    }

    #[tokio::test]
    async fn test_open_channel_waits_for_completion() {
        let (tx, mut source) = ChannelSource::channel(8);
        tx.send(Ok("partial".into())).await.unwrap();

        assert_eq!(source.read().await.unwrap(), ReadResult::chunk("partial"));

        drop(tx);
        assert_eq!(source.read().await.unwrap(), ReadResult::finished());
    }

    #[tokio::test]
    async fn test_error_item_fails_read() {
        let (tx, mut source) = ChannelSource::channel(8);
        tx.send(Ok("a".into())).await.unwrap();
        tx.send(Err(StreamError::transport("dropped"))).await.unwrap();

        assert_eq!(source.read().await.unwrap(), ReadResult::chunk("a"));
        assert!(matches!(
            source.read().await,
            Err(StreamError::Transport(_))
        ));
    }
}
