//! Chunk Sources
//!
//! Pull-based access to an already-decoded text stream. The consumer loop
//! only ever sees [`ChunkSource::read`]; adapters here turn channels and
//! HTTP byte streams into that shape.
//!
//! # Usage
//!
//! ```ignore
//! use chatty_core::source::{ChannelSource, ChunkSource};
//! use tokio::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel(16);
//! let mut source = ChannelSource::new(rx);
//! tx.send(Ok("hello".to_string())).await?;
//! drop(tx);
//! let first = source.read().await?;
//! ```

mod byte_stream;
mod channel;
mod traits;

pub use byte_stream::ByteStreamSource;
pub use channel::ChannelSource;
pub use traits::{ChunkSource, ReadResult};
