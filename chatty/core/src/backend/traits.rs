//! Chat Backend Trait
//!
//! Abstraction over "send a message, get a chunk source back", so the
//! session works against the HTTP endpoint or any other producer.

use async_trait::async_trait;

use crate::error::StreamError;
use crate::source::ChunkSource;

/// Backend that answers a user message with a streamed response
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Get the backend name (e.g., "http")
    fn name(&self) -> &str;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Send `message` and return the response as a chunk source
    ///
    /// Failures to connect or a non-success status are reported here;
    /// failures after the body started streaming surface from the source.
    async fn open_stream(&self, message: &str) -> Result<Box<dyn ChunkSource>, StreamError>;
}
