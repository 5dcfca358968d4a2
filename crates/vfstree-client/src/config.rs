//! Client configuration.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

/// Request timeout used unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors setting up a client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Where the device lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: Url,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Parse a base URL. A bare host (`192.168.4.1`) is taken as `http://`.
    pub fn new(url: &str) -> Result<Self, ClientError> {
        let text = if url.contains("://") {
            url.to_string()
        } else {
            format!("http://{url}")
        };
        let parsed = Url::parse(&text).map_err(|e| ClientError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl {
                url: url.to_string(),
                reason: "expected an http(s) url".to_string(),
            });
        }
        Ok(Self {
            url: parsed,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::bare_host("192.168.4.1", "http://192.168.4.1/")]
    #[case::http("http://esp.local", "http://esp.local/")]
    #[case::https_with_prefix("https://gw.example/device/", "https://gw.example/device/")]
    fn parses_base_urls(#[case] input: &str, #[case] expected: &str) {
        let config = ClientConfig::new(input).unwrap();
        assert_eq!(config.url.as_str(), expected);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[rstest]
    #[case::not_http("ftp://esp.local")]
    #[case::garbage("http://")]
    fn rejects_bad_urls(#[case] input: &str) {
        assert!(matches!(
            ClientConfig::new(input),
            Err(ClientError::InvalidUrl { .. })
        ));
    }
}
