//! Interactive loop
//!
//! Reads one message per line from stdin and types out each reply. Ctrl-C
//! during a reply cancels that request; Ctrl-C at the prompt exits.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWrite, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use chatty_core::{ChatBackend, ChatSession, MessageRole, StreamError};

use crate::sink::TerminalSink;

const PROMPT: &str = "> ";

/// A parsed line of input
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Leave the loop
    Quit,
    /// Print the conversation so far
    History,
    /// Forget the conversation
    Clear,
    /// Send a message
    Message(String),
    /// Blank line
    Empty,
}

impl Command {
    /// Parse one input line
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Empty,
            "/quit" | "/exit" => Self::Quit,
            "/history" => Self::History,
            "/clear" => Self::Clear,
            text => Self::Message(text.to_string()),
        }
    }
}

/// Cancel `cancel` on the next Ctrl-C
pub fn cancel_on_ctrl_c(cancel: &CancellationToken) -> JoinHandle<()> {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling request");
            cancel.cancel();
        }
    })
}

/// Send one message, printing the reply or the reason it stopped
///
/// Cancellation is reported but not treated as an error.
pub async fn send_message<B, W>(
    session: &mut ChatSession<B>,
    sink: &mut TerminalSink<W>,
    message: String,
) -> Result<(), StreamError>
where
    B: ChatBackend,
    W: AsyncWrite + Unpin + Send,
{
    let cancel = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(&cancel);
    let result = session.send(message, sink, &cancel).await;
    watcher.abort();

    match result {
        Ok(report) => {
            debug!(reveals = report.reveals, "Reply complete");
            Ok(())
        }
        Err(StreamError::Cancelled) => {
            // Output failures here are secondary to the cancellation itself
            let _ = sink.interrupt().await;
            let _ = sink.line("[cancelled]").await;
            Ok(())
        }
        Err(e) => {
            let _ = sink.interrupt().await;
            Err(e)
        }
    }
}

/// Run the interactive loop until `/quit`, end of input, or Ctrl-C at the prompt
pub async fn run<B, W>(session: &mut ChatSession<B>, sink: &mut TerminalSink<W>) -> Result<()>
where
    B: ChatBackend,
    W: AsyncWrite + Unpin + Send,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        sink.print(PROMPT).await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                sink.line("").await?;
                break;
            }
        };
        let Some(line) = line else {
            sink.line("").await?;
            break;
        };

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Clear => session.clear(),
            Command::History => {
                for msg in session.history() {
                    let who = match msg.role {
                        MessageRole::User => "you",
                        MessageRole::Assistant => "bot",
                    };
                    sink.line(&format!("[{who}] {}", msg.content)).await?;
                }
            }
            Command::Message(text) => {
                if let Err(e) = send_message(session, sink, text).await {
                    sink.line(&format!("error: {e}")).await?;
                }
            }
        }
    }

    Ok(())
}
