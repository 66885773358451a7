//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = concat!("portal-client/", env!("CARGO_PKG_VERSION"));

/// Errors building a [`PortalConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Connection settings for one portal backend.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Backend origin, optionally with a path prefix (e.g. `/api/v1`).
    pub base_url: Url,
    /// Transport-level timeout applied to every request.
    pub timeout: Duration,
    pub user_agent: String,
    /// Where to persist the session for hydration on restart; `None`
    /// disables persistence.
    pub session_file: Option<PathBuf>,
    /// Paths exempt from credential injection beyond the built-in set.
    pub extra_exempt_paths: Vec<String>,
}

impl PortalConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            ..Self::default()
        })
    }

    /// Read settings from the environment (`PORTAL_BASE_URL`,
    /// `PORTAL_TIMEOUT_SECS`, `PORTAL_USER_AGENT`, `PORTAL_SESSION_FILE`),
    /// loading a `.env` file first when one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = match std::env::var("PORTAL_BASE_URL") {
            Ok(value) => Self::new(&value)?,
            Err(_) => Self::default(),
        };
        if let Ok(value) = std::env::var("PORTAL_TIMEOUT_SECS") {
            let secs: u64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORTAL_TIMEOUT_SECS",
                value: value.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(value) = std::env::var("PORTAL_USER_AGENT") {
            config.user_agent = value;
        }
        if let Ok(value) = std::env::var("PORTAL_SESSION_FILE") {
            config.session_file = Some(PathBuf::from(value));
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    pub fn with_exempt_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_exempt_paths
            .extend(paths.into_iter().map(Into::into));
        self
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            session_file: None,
            extra_exempt_paths: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PortalConfig::default();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("portal-client/"));
        assert!(config.session_file.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = PortalConfig::new("https://portal.example.com/api")
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("kiosk/1.0")
            .with_session_file("/tmp/session.json")
            .with_exempt_paths(["/health"]);

        assert_eq!(config.base_url.path(), "/api");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "kiosk/1.0");
        assert_eq!(config.extra_exempt_paths, vec!["/health".to_string()]);
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(PortalConfig::new("not a url").is_err());
    }
}
