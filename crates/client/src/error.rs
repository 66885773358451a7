//! Client construction errors.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors building a [`PortalClient`](crate::PortalClient).
///
/// Request-time failures are [`portal_gateway::GatewayError`]; this type only
/// covers wiring the client together.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client construction failed: {0}")]
    Http(#[from] reqwest::Error),
}
