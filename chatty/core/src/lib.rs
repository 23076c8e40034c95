//! Chatty Core - Paced Streaming Reveal for Chat Clients
//!
//! This crate consumes a chat response that arrives as a chunked text
//! stream and replays it to a display sink one character at a time, so the
//! answer appears to be typed live while it is still being produced.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   POST {"content": ...}   ┌──────────────────────┐
//! │  ChatSession │ ────────────────────────▶ │ ChatBackend          │
//! │  (history)   │ ◀──── Box<dyn ChunkSource>│ (ChatClient / HTTP)  │
//! └──────┬───────┘                           └──────────────────────┘
//!        │ run(source, sink, cancel)
//!        ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     StreamConsumerLoop                           │
//! │   Reading ──▶ Flushing ──▶ Completed                             │
//! │      │ append                 │ end_of_stream() (exactly once)   │
//! │      ▼                        ▼                                  │
//! │  Accumulator ──▶ RevealScheduler ──▶ RevealSink::partial_update  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`StreamConsumerLoop`]: runs one request through the state machine
//! - [`RevealScheduler`]: paces one-character-growing prefixes to the sink
//! - [`ChunkSource`]: pull interface over the decoded response
//! - [`RevealSink`]: the display side (partial updates + end of stream)
//! - [`ChatSession`]: message history plus request orchestration
//!
//! # Quick Start
//!
//! ```ignore
//! use chatty_core::{ChatClient, ChatSession, ChannelSink, StreamConsumerLoop};
//! use chatty_core::config::ChattyConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ChattyConfig::default();
//! let client = ChatClient::new(&config.endpoint)?;
//! let mut session = ChatSession::new(client, StreamConsumerLoop::from_config(&config.reveal));
//!
//! let (mut sink, mut rx) = ChannelSink::channel(64);
//! session.send("Hello!", &mut sink, &CancellationToken::new()).await?;
//! ```
//!
//! # Module Overview
//!
//! - [`backend`]: HTTP client for the streaming endpoint
//! - [`config`]: TOML/env/CLI configuration
//! - [`error`]: stream failure taxonomy
//! - [`session`]: conversation history
//! - [`source`]: chunk sources (channel, byte stream)
//! - [`streaming`]: accumulator, scheduler, consumer loop, sinks

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod config;
pub mod error;
pub mod session;
pub mod source;
pub mod streaming;

// Re-exports for convenience
pub use backend::{ChatBackend, ChatClient};
pub use config::{
    default_config_path, load_config, load_config_from_path, ChattyConfig, ChattyToml,
    ConfigError, ConfigOverrides, ConfigSource, EndpointConfig, RevealConfig,
};
pub use error::StreamError;
pub use session::{ChatMessage, ChatSession, MessageId, MessageRole};
pub use source::{ByteStreamSource, ChannelSource, ChunkSource, ReadResult};
pub use streaming::{
    Accumulator, ChannelSink, RevealEvent, RevealReport, RevealScheduler, RevealSink,
    RevealState, RevealTimer, StreamConsumerLoop, StreamState, TokioTimer,
};
