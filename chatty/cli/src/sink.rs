//! Terminal output sink
//!
//! Each partial update carries the whole revealed prefix; only the bytes not
//! yet printed are written, so the reply appears to be typed in place.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use chatty_core::RevealSink;

/// Writes revealed text to a terminal (or any async writer)
pub struct TerminalSink<W> {
    out: W,
    printed: usize,
}

impl<W> TerminalSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Wrap a writer
    pub fn new(out: W) -> Self {
        Self { out, printed: 0 }
    }

    /// Write text without a trailing newline
    pub async fn print(&mut self, text: &str) -> anyhow::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }

    /// Write a full line
    pub async fn line(&mut self, text: &str) -> anyhow::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }

    /// Close off a reply that ended without an end-of-stream notification
    pub async fn interrupt(&mut self) -> anyhow::Result<()> {
        if self.printed > 0 {
            self.printed = 0;
            self.line("").await?;
        }
        Ok(())
    }

    /// Unwrap the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[async_trait]
impl<W> RevealSink for TerminalSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn partial_update(&mut self, text: &str) -> anyhow::Result<()> {
        let fresh = text.get(self.printed..).unwrap_or_default();
        self.out.write_all(fresh.as_bytes()).await?;
        self.out.flush().await?;
        self.printed = text.len();
        Ok(())
    }

    async fn end_of_stream(&mut self) -> anyhow::Result<()> {
        self.printed = 0;
        self.line("").await
    }
}
