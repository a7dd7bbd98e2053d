//! Client configuration.
//!
//! Use the builder methods to customize a [`ClientConfig`], or load one from the
//! environment with [`ClientConfig::from_env`].
//!
//! # Example
//!
//! ```
//! use ragflow::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("http://localhost:9380")
//!     .with_api_key("ragflow-xxxx")
//!     .with_request_timeout(Duration::from_secs(10));
//! assert_eq!(config.base_url, "http://localhost:9380");
//! ```

use std::time::Duration;

use crate::error::{Error, Result};

/// Default RAGFlow API server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:9380";

/// Environment variable holding the API base URL.
pub const ENV_BASE_URL: &str = "RAGFLOW_BASE_URL";
/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "RAGFLOW_API_KEY";
/// Environment variable holding the non-streaming request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "RAGFLOW_TIMEOUT_SECS";

/// Initial capacity of the frame reader's line buffer.
pub const INITIAL_LINE_BUFFER: usize = 64 * 1024;
/// Default maximum length of a single stream line.
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;
/// Default number of events buffered between the stream producer and its consumer.
pub const DEFAULT_STREAM_BUFFER: usize = 32;

/// Configuration for a [`RagflowClient`](crate::RagflowClient).
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash (e.g. `http://localhost:9380`)
    pub base_url: String,
    /// Bearer token sent on every request
    pub api_key: Option<String>,
    /// Timeout for non-streaming requests (streams are bounded only by cancellation)
    pub request_timeout: Option<Duration>,
    /// TCP connect timeout for all requests
    pub connect_timeout: Option<Duration>,
    /// Maximum size of one `data:` line before the stream fails
    pub max_line_bytes: usize,
    /// Capacity of the event channel between producer and consumer
    pub stream_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            request_timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            stream_buffer: DEFAULT_STREAM_BUFFER,
        }
    }
}

impl ClientConfig {
    /// Create a config pointing at `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base_url(base_url.into()),
            ..Self::default()
        }
    }

    /// Load configuration from `RAGFLOW_BASE_URL`, `RAGFLOW_API_KEY` and
    /// `RAGFLOW_TIMEOUT_SECS`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(ENV_BASE_URL) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        };

        if let Ok(key) = std::env::var(ENV_API_KEY) {
            if !key.trim().is_empty() {
                config.api_key = Some(key.trim().to_string());
            }
        }

        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a number of seconds, got {:?}", ENV_TIMEOUT_SECS, raw))
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Set the API key used for bearer authentication.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the timeout applied to non-streaming requests.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the TCP connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum length of a single stream line.
    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }

    /// Set the event channel capacity.
    pub fn with_stream_buffer(mut self, capacity: usize) -> Self {
        self.stream_buffer = capacity;
        self
    }

    /// Check the configuration for values the client cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.stream_buffer == 0 {
            return Err(Error::Config("stream buffer must be at least 1".to_string()));
        }
        if self.max_line_bytes < INITIAL_LINE_BUFFER {
            return Err(Error::Config(format!(
                "max line size must be at least {} bytes",
                INITIAL_LINE_BUFFER
            )));
        }
        Ok(())
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var(ENV_BASE_URL);
        std::env::remove_var(ENV_API_KEY);
        std::env::remove_var(ENV_TIMEOUT_SECS);
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.max_line_bytes, 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = ClientConfig::new("http://example.com:9380/");
        assert_eq!(config.base_url, "http://example.com:9380");
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::new("https://rag.example.com")
            .with_api_key("key")
            .with_request_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_secs(2))
            .with_max_line_bytes(2 * 1024 * 1024)
            .with_stream_buffer(4);
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.max_line_bytes, 2 * 1024 * 1024);
        assert_eq!(config.stream_buffer, 4);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ClientConfig::new("localhost:9380").validate().is_err());
        assert!(ClientConfig::default().with_stream_buffer(0).validate().is_err());
        assert!(ClientConfig::default().with_max_line_bytes(1024).validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_variables() {
        clear_env();
        std::env::set_var(ENV_BASE_URL, "http://rag.internal:8080/");
        std::env::set_var(ENV_API_KEY, " secret ");
        std::env::set_var(ENV_TIMEOUT_SECS, "12");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, "http://rag.internal:8080");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(12)));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_when_unset() {
        clear_env();
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_timeout() {
        clear_env();
        std::env::set_var(ENV_TIMEOUT_SECS, "soon");
        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        clear_env();
    }
}
