//! Endpoint resolution
//!
//! Decides, from the host the session runs on, whether requests go straight
//! to the hosted backend or through the local development proxy.

use reqwest::Url;
use thiserror::Error;

/// Hosted text-generation backend
pub const PRODUCTION_ENDPOINT: &str =
    "https://epic-backend-4syrirugh-beingmartinbmcs-projects.vercel.app/api/generic";

/// Path served by the development proxy, relative to the dev origin
pub const DEVELOPMENT_PROXY_PATH: &str = "/api/generic";

const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1", "[::1]"];

#[derive(Debug, Error)]
#[error("invalid endpoint url: {0}")]
pub struct EndpointError(String);

/// Routing convention for the generation endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Absolute URL of the hosted backend
    Production,
    /// Relative path routed through the local dev proxy
    DevelopmentProxy,
}

impl Endpoint {
    /// Pick the endpoint for a host name. Loopback hosts use the dev proxy.
    pub fn for_host(host: &str) -> Self {
        let host = host.trim();
        if LOOPBACK_HOSTS
            .iter()
            .any(|loopback| host.eq_ignore_ascii_case(loopback))
        {
            Endpoint::DevelopmentProxy
        } else {
            Endpoint::Production
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Endpoint::Production => PRODUCTION_ENDPOINT,
            Endpoint::DevelopmentProxy => DEVELOPMENT_PROXY_PATH,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Endpoint::Production)
    }

    /// Absolute URL to POST to. The dev proxy path is joined onto `dev_origin`;
    /// the production URL ignores it.
    pub fn request_url(self, dev_origin: &Url) -> Result<Url, EndpointError> {
        match self {
            Endpoint::Production => {
                Url::parse(PRODUCTION_ENDPOINT).map_err(|e| EndpointError(e.to_string()))
            }
            Endpoint::DevelopmentProxy => dev_origin
                .join(DEVELOPMENT_PROXY_PATH)
                .map_err(|e| EndpointError(e.to_string())),
        }
    }
}

/// Base URL for the given host name
pub fn resolve_base_url(host: &str) -> &'static str {
    Endpoint::for_host(host).base_url()
}
