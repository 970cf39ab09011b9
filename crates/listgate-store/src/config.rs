//! Store client configuration.

use std::time::Duration;

use url::Url;

use crate::error::StoreError;

/// Connection settings for the remote store.
///
/// Credentials are exchanged for a token on every [`Session::authenticate`]
/// call; the config itself is cheap to clone and carries no live state.
///
/// [`Session::authenticate`]: crate::Session::authenticate
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the store site, without a trailing slash.
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Timeout for establishing a TCP connection.
    pub connect_timeout: Duration,
    /// Whole-request timeout for each call.
    pub request_timeout: Duration,
}

impl StoreConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            username: username.into(),
            password: password.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check the configuration is usable before any I/O happens.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.base_url.is_empty() {
            return Err(StoreError::InvalidConfiguration {
                message: "base URL must not be empty".to_string(),
            });
        }
        let url = Url::parse(&self.base_url).map_err(|e| StoreError::InvalidConfiguration {
            message: format!("invalid base URL '{}': {e}", self.base_url),
        })?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(StoreError::InvalidConfiguration {
                    message: format!("unsupported URL scheme '{scheme}'"),
                });
            }
        }
        if self.username.is_empty() || self.password.is_empty() {
            return Err(StoreError::InvalidConfiguration {
                message: "username and password must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> StoreConfig {
        StoreConfig::new(base, "svc-account", "secret")
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        assert_eq!(
            config("https://store.example.com/sites/ops//").base_url,
            "https://store.example.com/sites/ops"
        );
    }

    #[test]
    fn validate_accepts_http_and_https() {
        assert!(config("https://store.example.com").validate().is_ok());
        assert!(config("http://store.example.com").validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_urls() {
        assert!(config("").validate().is_err());
        assert!(config("not a url").validate().is_err());
        assert!(config("ftp://store.example.com").validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_credentials() {
        let cfg = StoreConfig::new("https://store.example.com", "", "secret");
        assert!(cfg.validate().is_err());
    }
}
