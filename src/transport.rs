//! Transport adapter for the text-generation endpoint
//!
//! One call per user action: send the prompt with its system context, get
//! display text back or a typed [`TransportError`].

mod error;
mod http;
mod normalize;

pub use error::{TransportError, TransportErrorKind};
pub use http::HttpTransport;
pub use normalize::{normalize_response, ResponseShape, REPHRASE_GUIDANCE};

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Client for the generation endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `prompt` with `context` and return the normalized reply text
    async fn call_ai(&self, prompt: &str, context: &str) -> Result<String, TransportError>;

    /// Endpoint description for diagnostics
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn call_ai(&self, prompt: &str, context: &str) -> Result<String, TransportError> {
        (**self).call_ai(prompt, context).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for transports.
///
/// Numbers each generation request and records whether the reply was the
/// rephrase fallback and whether a failure looked like a connectivity problem.
pub struct LoggingTransport {
    inner: Arc<dyn Transport>,
    endpoint: String,
    requests: AtomicU64,
}

impl LoggingTransport {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        let endpoint = inner.endpoint().to_string();
        Self {
            inner,
            endpoint,
            requests: AtomicU64::new(0),
        }
    }

    /// Requests sent through this wrapper so far
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Transport for LoggingTransport {
    async fn call_ai(&self, prompt: &str, context: &str) -> Result<String, TransportError> {
        let request = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
        let start = std::time::Instant::now();
        let result = self.inner.call_ai(prompt, context).await;
        let duration = start.elapsed();

        match &result {
            Ok(text) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    request,
                    duration_ms = %duration.as_millis(),
                    prompt_chars = prompt.chars().count(),
                    response_chars = text.chars().count(),
                    rephrase_fallback = text == REPHRASE_GUIDANCE,
                    "Generation request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint,
                    request,
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    status = ?e.status,
                    connectivity = e.is_connectivity(),
                    error = %e.message,
                    "Generation request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
