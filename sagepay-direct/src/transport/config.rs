//! Transport configuration types.
//!
//! This module defines the TOML-deserializable `[transport]` section of the
//! gateway configuration.
//!
//! # Examples
//!
//! ```toml
//! [transport]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//! http_version = "http1"
//!
//! [transport.proxy]
//! url = "http://proxy.internal:3128"
//! username = "payments"
//! password = "secret"
//! ```

use std::{fmt, time::Duration};

use serde::Deserialize;

use crate::error::{Result, SagePayError};

/// HTTP transport configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Maximum idle connections per host.
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// HTTP version preference.
    #[serde(default)]
    pub http_version: HttpVersion,

    /// Outbound proxy.
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: default_pool_max_idle(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            http_version: HttpVersion::default(),
            proxy: None,
        }
    }
}

impl HttpConfig {
    /// Validates configuration values are within acceptable bounds.
    ///
    /// # Errors
    ///
    /// Returns `SagePayError::ConfigurationError` if:
    /// - `timeout_secs` is outside 1-300 seconds
    /// - `connect_timeout_secs` is outside 1-60 seconds
    /// - the proxy URL is empty
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(SagePayError::ConfigurationError(
                "timeout_secs must be between 1 and 300".to_owned(),
            ));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 60 {
            return Err(SagePayError::ConfigurationError(
                "connect_timeout_secs must be between 1 and 60".to_owned(),
            ));
        }
        if let Some(ref proxy) = self.proxy
            && proxy.url.trim().is_empty()
        {
            return Err(SagePayError::ConfigurationError("proxy url cannot be empty".to_owned()));
        }
        Ok(())
    }

    /// Returns timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns connect timeout as Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// HTTP version preference.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HttpVersion {
    /// HTTP/1.1 only.
    Http1,
    /// HTTP/2 only (requires prior knowledge or ALPN negotiation).
    Http2,
    /// Auto-negotiate (prefer HTTP/2, fall back to HTTP/1.1).
    #[default]
    Auto,
}

/// Outbound HTTP proxy.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyConfig {
    /// Proxy URL, e.g. `http://proxy.internal:3128`.
    pub url: String,
    /// Basic-auth user name.
    #[serde(default)]
    pub username: Option<String>,
    /// Basic-auth password.
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn default_pool_max_idle() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_default() {
        let config = HttpConfig::default();
        assert_eq!(config.pool_max_idle_per_host, 10);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.http_version, HttpVersion::Auto);
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_http_config_timeout() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_http_config_from_toml() {
        let toml = "
            pool_max_idle_per_host = 20
            timeout_secs = 45
            connect_timeout_secs = 15
            http_version = \"http1\"
        ";

        let config: HttpConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.pool_max_idle_per_host, 20);
        assert_eq!(config.timeout_secs, 45);
        assert_eq!(config.connect_timeout_secs, 15);
        assert_eq!(config.http_version, HttpVersion::Http1);
    }

    #[test]
    fn test_http_config_empty_toml() {
        let config: HttpConfig = toml::from_str("").unwrap();
        assert_eq!(config, HttpConfig::default());
    }

    #[test]
    fn test_http_config_with_proxy() {
        let toml = r#"
            [proxy]
            url = "http://proxy.internal:3128"
            username = "payments"
            password = "secret"
        "#;

        let config: HttpConfig = toml::from_str(toml).unwrap();
        let proxy = config.proxy.unwrap();
        assert_eq!(proxy.url, "http://proxy.internal:3128");
        assert_eq!(proxy.username.as_deref(), Some("payments"));
        assert_eq!(proxy.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_proxy_debug_redacts_password() {
        let proxy = ProxyConfig {
            url: "http://proxy.internal:3128".to_owned(),
            username: Some("payments".to_owned()),
            password: Some("secret".to_owned()),
        };
        let debug = format!("{proxy:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_http_version_invalid_value() {
        #[derive(Deserialize)]
        #[allow(dead_code, reason = "field used for deserialization test")]
        struct Wrapper {
            http_version: HttpVersion,
        }

        let result: std::result::Result<Wrapper, _> = toml::from_str("http_version = \"http3\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_http_config_validate_default() {
        assert!(HttpConfig::default().validate().is_ok());
    }

    #[test]
    fn test_http_config_validate_valid_bounds() {
        let config = HttpConfig { timeout_secs: 1, connect_timeout_secs: 1, ..Default::default() };
        assert!(config.validate().is_ok());

        let config =
            HttpConfig { timeout_secs: 300, connect_timeout_secs: 60, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_http_config_validate_timeout_out_of_range() {
        for timeout_secs in [0, 301] {
            let config = HttpConfig { timeout_secs, ..Default::default() };
            assert!(matches!(config.validate(), Err(SagePayError::ConfigurationError(_))));
        }
    }

    #[test]
    fn test_http_config_validate_connect_timeout_out_of_range() {
        for connect_timeout_secs in [0, 61] {
            let config = HttpConfig { connect_timeout_secs, ..Default::default() };
            assert!(matches!(config.validate(), Err(SagePayError::ConfigurationError(_))));
        }
    }

    #[test]
    fn test_http_config_validate_empty_proxy() {
        let config = HttpConfig {
            proxy: Some(ProxyConfig { url: " ".to_owned(), username: None, password: None }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
