//! Inference server endpoint configuration.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Default connect timeout for the inference server.
///
/// Only connection setup is bounded; a slow completion is left to the
/// server's own timeout policy.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors for an invalid endpoint URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("Engine URL cannot be empty")]
    Empty,

    #[error("Engine URL must start with http:// or https://, got {0}")]
    UnsupportedScheme(String),
}

/// Base URL of an OpenAI-compatible inference server.
///
/// # Examples
///
/// ```rust
/// use playground_runtime::EngineEndpoint;
///
/// let endpoint = EngineEndpoint::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(endpoint.models_url(), "http://127.0.0.1:8080/v1/models");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEndpoint {
    base_url: String,
    connect_timeout: Duration,
}

impl EngineEndpoint {
    /// Parse a base URL, dropping trailing slashes.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty URL or a non-HTTP scheme.
    pub fn parse(url: &str) -> Result<Self, EndpointError> {
        let trimmed = url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(EndpointError::Empty);
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(EndpointError::UnsupportedScheme(trimmed.to_string()));
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }

    /// Endpoint for a local server on `port`.
    #[must_use]
    pub fn local(port: u16) -> Self {
        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn models_url(&self) -> String {
        format!("{}/v1/models", self.base_url)
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

impl fmt::Display for EngineEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_trailing_slashes() {
        let endpoint = EngineEndpoint::parse(" https://gpu-box:8000// ").unwrap();
        assert_eq!(endpoint.base_url(), "https://gpu-box:8000");
        assert_eq!(
            endpoint.chat_completions_url(),
            "https://gpu-box:8000/v1/chat/completions"
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(EngineEndpoint::parse("  "), Err(EndpointError::Empty));
        assert!(matches!(
            EngineEndpoint::parse("ws://localhost:8080"),
            Err(EndpointError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_local() {
        let endpoint = EngineEndpoint::local(5500).with_connect_timeout(Duration::from_secs(1));
        assert_eq!(endpoint.to_string(), "http://127.0.0.1:5500");
        assert_eq!(endpoint.connect_timeout(), Duration::from_secs(1));
    }
}
