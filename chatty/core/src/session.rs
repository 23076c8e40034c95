//! Chat Session
//!
//! Holds the message history of one conversation and runs each request
//! through the consumer loop. The history is an explicit object owned by
//! the caller rather than state shared across renders; a failed request
//! leaves the user message in place and records no assistant reply.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::backend::ChatBackend;
use crate::error::StreamError;
use crate::streaming::{RevealReport, RevealSink, StreamConsumerLoop};

/// Unique message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Generate a new unique message ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who sent a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// User input
    User,
    /// Streamed reply
    Assistant,
}

/// A message in the conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Message content
    pub content: String,
    /// When the message was recorded (Unix timestamp ms)
    pub timestamp: u64,
}

impl ChatMessage {
    /// Create a new message
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            timestamp: now_ms(),
        }
    }
}

/// A conversation against one backend
///
/// `send` takes `&mut self`, so requests on a session are serialised.
pub struct ChatSession<B: ChatBackend> {
    backend: B,
    consumer: StreamConsumerLoop,
    messages: Vec<ChatMessage>,
}

impl<B: ChatBackend> ChatSession<B> {
    /// Create an empty session
    pub fn new(backend: B, consumer: StreamConsumerLoop) -> Self {
        Self {
            backend,
            consumer,
            messages: Vec::new(),
        }
    }

    /// The backend this session talks to
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Send a message and reveal the reply to `sink`
    ///
    /// The assistant reply is added to the history only when the whole
    /// response was revealed and the sink acknowledged the end of stream.
    pub async fn send<S>(
        &mut self,
        content: impl Into<String>,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<RevealReport, StreamError>
    where
        S: RevealSink + ?Sized,
    {
        let content = content.into();
        self.messages
            .push(ChatMessage::new(MessageRole::User, content.clone()));

        let opened = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(StreamError::Cancelled),
            source = self.backend.open_stream(&content) => source,
        };
        let mut source = opened?;
        let report = self.consumer.run(source.as_mut(), sink, cancel).await?;

        self.messages
            .push(ChatMessage::new(MessageRole::Assistant, report.text.clone()));
        debug!(
            backend = self.backend.name(),
            history = self.messages.len(),
            "Recorded assistant reply"
        );
        Ok(report)
    }

    /// All messages, oldest first
    pub fn history(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Most recent assistant reply
    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
    }

    /// Render the history as plain text
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for msg in &self.messages {
            let role = match msg.role {
                MessageRole::User => "You",
                MessageRole::Assistant => "Assistant",
            };
            out.push_str(&format!("{role}: {}\n", msg.content));
        }
        out
    }

    /// Clear message history
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Get current time in milliseconds
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
