//! HTTP Chat Client
//!
//! Posts `{"content": "..."}` to the streaming endpoint and hands the chunked
//! response body to a [`ByteStreamSource`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::Serialize;
use tracing::{debug, warn};

use super::traits::ChatBackend;
use crate::config::EndpointConfig;
use crate::error::StreamError;
use crate::source::{ByteStreamSource, ChunkSource};

/// Request body sent to the streaming endpoint
#[derive(Clone, Debug, Serialize)]
pub struct StreamRequest<'a> {
    /// The user's message
    pub content: &'a str,
}

/// HTTP client for the streaming endpoint
#[derive(Clone, Debug)]
pub struct ChatClient {
    endpoint: Url,
    http_client: reqwest::Client,
    idle_timeout: Duration,
}

impl ChatClient {
    /// Create a client for the configured endpoint
    ///
    /// The configured timeout bounds connecting, waiting for the response
    /// headers, and each wait for the next body chunk. The body as a whole
    /// has no deadline, since it is read only as fast as it is revealed.
    pub fn new(config: &EndpointConfig) -> Result<Self, StreamError> {
        let endpoint = Url::parse(&config.url)
            .map_err(|e| StreamError::transport(format!("invalid endpoint {}: {e}", config.url)))?;
        let http_client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()?;

        Ok(Self {
            endpoint,
            http_client,
            idle_timeout: config.timeout,
        })
    }

    /// The endpoint messages are posted to
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn origin(&self) -> Url {
        let mut origin = self.endpoint.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(self.origin())
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok()
    }

    async fn open_stream(&self, message: &str) -> Result<Box<dyn ChunkSource>, StreamError> {
        debug!(endpoint = %self.endpoint, bytes = message.len(), "Posting message");

        let request = self
            .http_client
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .json(&StreamRequest { content: message })
            .send();
        let response = tokio::time::timeout(self.idle_timeout, request)
            .await
            .map_err(|_| {
                StreamError::transport(format!(
                    "no response from {} within {:?}",
                    self.endpoint, self.idle_timeout
                ))
            })??;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Endpoint rejected message");
            return Err(StreamError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(Box::new(
            ByteStreamSource::new(response.bytes_stream()).with_idle_timeout(self.idle_timeout),
        ))
    }
}
