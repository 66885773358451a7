//! Gateway error types.

use reqwest::StatusCode;
use thiserror::Error;

use crate::envelope::codes;

/// Errors surfaced by the authenticated request gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Application-level failure carried in a response envelope.
    #[error("API error {code}: {message} (HTTP {status})")]
    Api {
        status: StatusCode,
        code: i32,
        message: String,
    },

    /// Non-2xx response whose body is not a valid envelope.
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// 2xx response whose body could not be parsed as an envelope.
    #[error("Malformed response body: {0}")]
    MalformedResponse(String),

    /// Payload deserialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl GatewayError {
    /// Whether this failure is the expired-access-token signal that makes a
    /// request eligible for refresh-and-retry.
    pub fn is_credential_expired(&self) -> bool {
        matches!(self, Self::Api { code, .. } if *code == codes::TOKEN_EXPIRED)
    }

    /// Whether this failure indicates the caller lacks permission.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Api { code, .. } if *code == codes::FORBIDDEN)
    }

    /// HTTP status of the failing response, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status(),
            _ => None,
        }
    }
}
