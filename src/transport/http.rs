//! HTTP transport to the generation endpoint

use super::normalize::ResponseShape;
use super::{Transport, TransportError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Longest body excerpt carried in error messages and logs
const BODY_EXCERPT_CHARS: usize = 500;

/// POSTs `{prompt, context}` as JSON and normalizes the reply
pub struct HttpTransport {
    client: Client,
    url: Url,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    context: &'a str,
}

impl HttpTransport {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call_ai(&self, prompt: &str, context: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&GenerateRequest { prompt, context })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    TransportError::network(format!("Connection failed: {e}"))
                } else {
                    TransportError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(TransportError::http_status(
                status.as_u16(),
                format!("HTTP {status}: {}", excerpt(&body)),
            ));
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            TransportError::decode(format!(
                "Failed to parse response: {e} - body: {}",
                excerpt(&body)
            ))
        })?;

        let shape = ResponseShape::decode(&value);
        if shape.is_miss() {
            tracing::warn!(body = %excerpt(&body), "Unexpected response structure");
        }
        Ok(shape.into_text())
    }

    fn endpoint(&self) -> &str {
        self.url.as_str()
    }
}

fn excerpt(body: &str) -> String {
    if body.chars().count() > BODY_EXCERPT_CHARS {
        let mut cut: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        body.to_string()
    }
}
