//! Session configuration
//!
//! Environment-driven, resolved once when the session is built.

use crate::catalog::{CatalogError, QuickPromptCatalog};
use crate::endpoint::{Endpoint, EndpointError};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_DEV_ORIGIN: &str = "http://localhost:4200";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MEDASSIST_DEV_ORIGIN is not a valid URL: {0}")]
    InvalidOrigin(String),
    #[error("MEDASSIST_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    InvalidTimeout(String),
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

/// Configuration for a chat session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Host name the session runs on; picks production vs. dev proxy
    pub host: String,
    /// Origin the dev proxy path is joined onto
    pub dev_origin: Url,
    /// Optional JSON file replacing the built-in quick prompts
    pub quick_prompts_path: Option<PathBuf>,
    /// HTTP client timeout
    pub request_timeout: Duration,
}

impl SessionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment, a map in tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("MEDASSIST_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let origin = lookup("MEDASSIST_DEV_ORIGIN").unwrap_or_else(|| DEFAULT_DEV_ORIGIN.to_string());
        let dev_origin =
            Url::parse(&origin).map_err(|e| ConfigError::InvalidOrigin(format!("{origin}: {e}")))?;

        let request_timeout = match lookup("MEDASSIST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            host,
            dev_origin,
            quick_prompts_path: lookup("MEDASSIST_QUICK_PROMPTS").map(PathBuf::from),
            request_timeout,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::for_host(&self.host)
    }

    /// Absolute URL requests are sent to
    pub fn request_url(&self) -> Result<Url, ConfigError> {
        Ok(self.endpoint().request_url(&self.dev_origin)?)
    }

    pub fn catalog(&self) -> Result<QuickPromptCatalog, CatalogError> {
        match &self.quick_prompts_path {
            Some(path) => QuickPromptCatalog::load(path),
            None => Ok(QuickPromptCatalog::builtin()),
        }
    }
}
