//! Chat Backend Integration
//!
//! Opens the response stream for a user message. The HTTP client talks to
//! the streaming endpoint; other backends (or test doubles) plug in through
//! [`ChatBackend`].
//!
//! # Usage
//!
//! ```ignore
//! use chatty_core::backend::{ChatBackend, ChatClient};
//! use chatty_core::config::EndpointConfig;
//!
//! let client = ChatClient::new(&EndpointConfig::default())?;
//! let mut source = client.open_stream("Hello!").await?;
//! ```

mod client;
mod traits;

pub use client::{ChatClient, StreamRequest};
pub use traits::ChatBackend;
