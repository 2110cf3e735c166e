//! Transport error types

use thiserror::Error;

/// Failure to obtain a usable response from the generation endpoint
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(TransportErrorKind::HttpStatus, message)
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Decode, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Internal, message)
    }

    /// Whether the failure looks like a connectivity or cross-origin problem.
    ///
    /// Only drives a cosmetic hint in the user-facing apology.
    pub fn is_connectivity(&self) -> bool {
        self.kind == TransportErrorKind::Network || self.message.contains("CORS")
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, DNS, timeout, body read failure
    Network,
    /// Non-2xx response
    HttpStatus,
    /// Body was not JSON
    Decode,
    /// The call died (panicked or was cancelled) without a result
    Internal,
}
