//! HTTP transport implementation.
//!
//! This module provides HTTP/1.1 and HTTP/2 transport using reqwest.

use reqwest::{Client, Proxy, header::CONTENT_TYPE};
use tracing::{debug, instrument};
use url::Url;

use super::config::{HttpConfig, HttpVersion, ProxyConfig};
use crate::{
    error::{Result, SagePayError},
    transport::{FORM_CONTENT_TYPE, Transport},
};

/// Validates URL for security constraints.
///
/// Card data only ever travels over TLS.
fn validate_url(url: &Url) -> Result<()> {
    if url.scheme() != "https" {
        return Err(SagePayError::TransportError("Only HTTPS URLs are allowed".to_owned()));
    }

    if url.host_str().is_none() {
        return Err(SagePayError::TransportError(format!("URL missing host: {url}")));
    }

    Ok(())
}

fn build_proxy(config: &ProxyConfig) -> Result<Proxy> {
    let proxy = Proxy::all(&config.url)
        .map_err(|e| SagePayError::ConfigurationError(format!("invalid proxy url: {e}")))?;

    Ok(match config.username {
        Some(ref username) => {
            proxy.basic_auth(username, config.password.as_deref().unwrap_or_default())
        }
        None => proxy,
    })
}

/// HTTP/1.1 and HTTP/2 transport using reqwest.
///
/// Supports connection pooling, keep-alive, an optional outbound proxy and
/// caller-configured timeouts.
///
/// # Examples
///
/// ```
/// use sagepay_direct::transport::{HttpConfig, HttpTransport, HttpVersion};
///
/// let config =
///     HttpConfig { timeout_secs: 20, http_version: HttpVersion::Http1, ..Default::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
}

impl HttpTransport {
    /// Creates a new HTTP transport with default settings.
    ///
    /// Default configuration:
    /// - Pool max idle per host: 10
    /// - Timeout: 30 seconds
    /// - Connect timeout: 10 seconds
    /// - HTTP version: Auto (prefer HTTP/2)
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default())
    }

    /// Creates HTTP transport with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is out of bounds, the proxy URL is
    /// invalid, or the HTTP client cannot be created.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .https_only(true);

        builder = match config.http_version {
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
            HttpVersion::Auto => builder,
        };

        if let Some(ref proxy) = config.proxy {
            builder = builder.proxy(build_proxy(proxy)?);
        }

        let client = builder.build().map_err(SagePayError::HttpError)?;

        Ok(Self { client, http_version: config.http_version })
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, body), fields(protocol = self.protocol_name(), body_len = body.len()))]
    async fn post_form<'a>(&'a self, url: &'a str, body: &'a str) -> Result<String> {
        let parsed = Url::parse(url)
            .map_err(|e| SagePayError::TransportError(format!("invalid url '{url}': {e}")))?;

        validate_url(&parsed)?;

        let response = self
            .client
            .post(parsed)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body.to_owned())
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "gateway responded");

        if !status.is_success() {
            return Err(SagePayError::TransportError(format!(
                "gateway returned HTTP status {}",
                status.as_u16()
            )));
        }

        let text = response.text().await.map_err(SagePayError::HttpError)?;

        Ok(text)
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}
