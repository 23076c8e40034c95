//! Error Types
//!
//! Failures that abort a reveal request. None of them are retried here;
//! the caller decides whether to resubmit the message.

use thiserror::Error;

/// Boxed error used as the source of transport and sink failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the stream consumer and the chunk sources feeding it
#[derive(Debug, Error)]
pub enum StreamError {
    /// The underlying read failed or the connection dropped mid-stream
    #[error("Transport failure: {0}")]
    Transport(#[source] BoxError),

    /// The endpoint answered with a non-success status
    #[error("Endpoint returned {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body (may be empty)
        body: String,
    },

    /// The byte stream could not be decoded into text
    #[error("Malformed stream: {0}")]
    Malformed(String),

    /// A sink callback failed
    #[error("Sink failure: {0}")]
    Sink(#[source] BoxError),

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,
}

impl StreamError {
    /// Wrap any error as a transport failure
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// Wrap a sink callback error
    pub fn sink(err: anyhow::Error) -> Self {
        Self::Sink(err.into())
    }

    /// Whether the failure came from the stream side (transport, status or decoding)
    #[must_use]
    pub fn is_stream_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Http { .. } | Self::Malformed(_)
        )
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}
