//! Transport abstraction layer.
//!
//! The gateway client never opens connections itself. It hands a resolved
//! URL and a form-encoded body to a [`Transport`] and receives the raw
//! response body back.
//!
//! # Architecture
//!
//! - **Transport**: moves bytes (TLS, proxying, timeouts)
//! - **`RequestBuilder` / `ResponseInterpreter`**: shape and read the gateway
//!   wire format
//!
//! [`HttpTransport`] is the reqwest-backed default. Tests and callers with
//! their own HTTP stack implement [`Transport`] directly.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sagepay_direct::transport::{HttpTransport, Transport};
//!
//! # async fn example() -> sagepay_direct::error::Result<()> {
//! let transport = HttpTransport::new()?;
//! let body = transport
//!     .post_form(
//!         "https://test.sagepay.com/Simulator/VSPDirectGateway.asp",
//!         "VPSProtocol=2.23&TxType=PAYMENT",
//!     )
//!     .await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;
use std::sync::Arc;

use crate::error::Result;

pub mod config;
pub mod http;

pub use config::{HttpConfig, HttpVersion, ProxyConfig};
pub use http::HttpTransport;

/// Content type of every request body sent to the gateway.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Outbound transport for gateway requests.
///
/// Implementations POST `body` with `Content-Type:
/// application/x-www-form-urlencoded` to `url` and return the response body
/// as text. Connection, TLS and HTTP-status failures are reported as errors;
/// a well-formed gateway answer is always `Ok`, whatever it says.
///
/// # Examples
///
/// ```
/// use sagepay_direct::{error::Result, transport::Transport};
///
/// #[derive(Debug)]
/// struct CannedTransport(&'static str);
///
/// impl Transport for CannedTransport {
///     async fn post_form<'a>(&'a self, _url: &'a str, _body: &'a str) -> Result<String> {
///         Ok(self.0.to_owned())
///     }
///
///     fn protocol_name(&self) -> &'static str {
///         "canned"
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// POSTs a form-encoded body and returns the raw response body.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be delivered or the server
    /// answers with a non-success status.
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        body: &'a str,
    ) -> impl Future<Output = Result<String>> + Send + 'a;

    /// Returns the protocol name for logging.
    ///
    /// Examples: "http/1.1", "http/2", "http"
    fn protocol_name(&self) -> &'static str;
}

impl<T: Transport> Transport for Arc<T> {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        body: &'a str,
    ) -> impl Future<Output = Result<String>> + Send + 'a {
        (**self).post_form(url, body)
    }

    fn protocol_name(&self) -> &'static str {
        (**self).protocol_name()
    }
}
