//! Error types for the Sage Pay Direct client.
//!
//! This module defines every error that can abort a gateway call. All errors
//! implement the standard [`std::error::Error`] trait via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Validation Errors** ([`SagePayError::ValidationError`]): required purchase
//!   input is missing or malformed
//! - **Card Errors** ([`SagePayError::UnsupportedBrandError`]): the card brand has no
//!   gateway code
//! - **Configuration Errors** ([`SagePayError::ConfigurationError`]): bad merchant
//!   credentials, unknown endpoint kind, unreadable config file
//! - **Transport Errors** ([`SagePayError::TransportError`], [`SagePayError::HttpError`]):
//!   network, TLS or HTTP-level failures
//!
//! A declined payment is **not** an error. The gateway answered, so the call
//! returns a [`GatewayResult`](crate::response::GatewayResult) with
//! `success == false`.
//!
//! # Examples
//!
//! ```
//! use sagepay_direct::error::{Result, SagePayError};
//!
//! fn require_order_id(order_id: Option<&str>) -> Result<&str> {
//!     order_id.ok_or_else(|| SagePayError::ValidationError("order_id is required".to_owned()))
//! }
//!
//! assert!(require_order_id(None).is_err());
//! ```

use thiserror::Error;

/// Result type alias for gateway operations.
///
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, SagePayError>;

/// Errors that can occur while talking to the gateway.
///
/// # Error Recovery
///
/// - **Transport errors** ([`HttpError`](Self::HttpError),
///   [`TransportError`](Self::TransportError)): the payment may or may not have
///   reached the gateway. This crate never retries; the caller decides.
/// - **Validation errors** ([`ValidationError`](Self::ValidationError),
///   [`UnsupportedBrandError`](Self::UnsupportedBrandError)): fix input and retry.
///   Nothing was sent.
/// - **Configuration errors** ([`ConfigurationError`](Self::ConfigurationError)):
///   fix the merchant configuration. Nothing was sent.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum SagePayError {
    /// Required purchase input is missing or invalid.
    ///
    /// Raised before any network call, for example when the order id or
    /// billing address is absent, the amount is not positive, or the card
    /// expiry month is outside 1-12.
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// The card brand has no gateway card-type code.
    ///
    /// # Examples
    ///
    /// ```
    /// use sagepay_direct::error::SagePayError;
    ///
    /// let err = SagePayError::UnsupportedBrandError("unknown".to_owned());
    /// assert_eq!(err.to_string(), "Unsupported card brand: unknown");
    /// ```
    #[error("Unsupported card brand: {0}")]
    UnsupportedBrandError(String),

    /// Merchant configuration is unusable.
    ///
    /// Common causes include:
    /// - Missing login (vendor name)
    /// - Password required by the protocol profile but not supplied
    /// - Unrecognised endpoint kind
    /// - Malformed TOML configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Transport-level failure that is not a [`reqwest::Error`].
    ///
    /// Covers non-HTTPS URLs, invalid proxy settings and non-success HTTP
    /// status codes.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// HTTP request failed.
    ///
    /// Wraps [`reqwest::Error`]: timeouts, refused connections, DNS and TLS
    /// failures.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl SagePayError {
    /// Returns true if the error originated in the network layer.
    ///
    /// Transport failures leave the payment outcome unknown, so callers
    /// usually reconcile before retrying.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::TransportError(_) | Self::HttpError(_))
    }
}
