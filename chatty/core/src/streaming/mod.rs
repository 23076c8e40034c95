//! Streaming Reveal
//!
//! Turns a chunked text response into a typewriter-style sequence of
//! growing prefixes for a display sink.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  read()   ┌────────────────────┐  append   ┌─────────────┐
//! │ ChunkSource │ ────────▶ │ StreamConsumerLoop │ ────────▶ │ Accumulator │
//! └─────────────┘           │ Reading            │           └──────┬──────┘
//!                           │   → Flushing       │                  │ unrevealed suffix
//!                           │   → Completed      │           ┌──────▼──────┐
//!                           └─────────┬──────────┘           │ Reveal-     │
//!                                     │ end_of_stream()      │ Scheduler   │
//!                                     ▼                      └──────┬──────┘
//!                               ┌───────────┐  partial_update(prefix)│
//!                               │ RevealSink│ ◀──────────────────────┘
//!                               └───────────┘
//! ```
//!
//! All state for one request lives in a [`RevealState`] owned by a single
//! [`StreamConsumerLoop::run`] call; nothing carries over between requests.

mod accumulator;
mod consumer;
mod scheduler;
mod sink;
mod timer;

pub use accumulator::Accumulator;
pub use consumer::{RevealReport, RevealState, StreamConsumerLoop, StreamState};
pub use scheduler::RevealScheduler;
pub use sink::{ChannelSink, RevealEvent, RevealSink};
pub use timer::{RevealTimer, TokioTimer};
