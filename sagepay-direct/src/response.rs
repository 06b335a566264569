//! Gateway response interpretation.
//!
//! The gateway answers with a plaintext `Key=Value` stream, one pair per
//! line. It is not strict form encoding, so [`LenientInterpreter`] scans for
//! pairs instead of decoding the body, and [`interpret`] turns the result
//! into a [`GatewayResult`]. Values may contain `&` and `=` (an `ACSURL` with
//! a query string, for instance).
//!
//! Nothing here fails. A body without a `Status` line still produces a
//! result, with `success == false` and [`NO_STATUS_MESSAGE`] as the message.
//!
//! # Examples
//!
//! ```
//! use sagepay_direct::response::{LenientInterpreter, ResponseInterpreter};
//!
//! let parsed = LenientInterpreter::new().parse("Status=OK\r\nStatusDetail=Success\r\n");
//! assert_eq!(parsed.status(), Some("OK"));
//! assert_eq!(parsed.status_detail(), Some("Success"));
//! ```

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::MerchantConfig,
    error::{Result, SagePayError},
    request::GatewayFieldMap,
    security,
};

/// Message used when the gateway response carries no `Status`.
pub const NO_STATUS_MESSAGE: &str = "No Status returned by gateway";

/// `Status` value of an approved transaction.
pub const STATUS_OK: &str = "OK";

/// `Status` value asking for 3-D Secure authentication.
pub const STATUS_3D_AUTH: &str = "3DAUTH";

/// One pair per line; the value runs to the end of the line.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static LINE_PAIR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)=([^\n]*)").expect("line pair pattern is valid"));

/// Single-line body with `&`-separated pairs.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static INLINE_PAIR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)=([^&]*)").expect("inline pair pattern is valid"));

/// Key/value pairs decoded from a gateway response body.
///
/// Keys are kept exactly as the gateway sent them. Values are trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsedResponse {
    fields: HashMap<String, String>,
}

impl ParsedResponse {
    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// `Status`.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.get("Status")
    }

    /// `StatusDetail`.
    #[must_use]
    pub fn status_detail(&self) -> Option<&str> {
        self.get("StatusDetail")
    }

    /// `VPSTxId`, the gateway transaction id.
    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        self.get("VPSTxId")
    }

    /// `SecurityKey`.
    #[must_use]
    pub fn security_key(&self) -> Option<&str> {
        self.get("SecurityKey")
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no pairs were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParsedResponse {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Strategy for decoding a raw response body.
pub trait ResponseInterpreter: Send + Sync {
    /// Decodes `body` into key/value pairs. Never fails.
    fn parse(&self, body: &str) -> ParsedResponse;
}

/// Tolerant `Key=Value` scanner.
///
/// A pair is a run of word characters, `=`, and the rest of the line. Only
/// the first `=` separates key from value. A body without any newline is
/// treated as `&`-separated pairs instead. Text that does not look like a
/// pair is skipped. Later duplicates replace earlier ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientInterpreter;

impl LenientInterpreter {
    /// Creates a new interpreter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ResponseInterpreter for LenientInterpreter {
    fn parse(&self, body: &str) -> ParsedResponse {
        let pattern =
            if body.contains('\n') { &*LINE_PAIR_PATTERN } else { &*INLINE_PAIR_PATTERN };

        pattern
            .captures_iter(body)
            .filter_map(|caps| {
                let key = caps.get(1)?.as_str();
                let value = caps.get(2).map_or("", |m| m.as_str()).trim();
                Some((key, value))
            })
            .collect()
    }
}

/// Handle for resuming or referencing an authorised transaction.
///
/// Serialized as JSON using the gateway's own key names so it can be stored
/// by the caller and handed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationToken {
    /// Gateway transaction id.
    #[serde(rename = "VPSTxId")]
    pub transaction_id: String,
    /// Gateway security key.
    #[serde(rename = "SecurityKey")]
    pub security_key: String,
    /// Merchant login that created the transaction.
    #[serde(rename = "VendorTxCode")]
    pub vendor_tx_code: String,
}

impl AuthorizationToken {
    /// Serializes the token to its opaque string form.
    ///
    /// # Errors
    ///
    /// Returns `SagePayError::ValidationError` if serialization fails.
    pub fn to_blob(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| SagePayError::ValidationError(format!("cannot encode authorization: {e}")))
    }

    /// Restores a token from [`to_blob`](Self::to_blob) output.
    ///
    /// # Errors
    ///
    /// Returns `SagePayError::ValidationError` if the blob is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use sagepay_direct::response::AuthorizationToken;
    ///
    /// let token = AuthorizationToken::from_blob(
    ///     r#"{"VPSTxId":"{ABC}","SecurityKey":"XYZ","VendorTxCode":"testvendor"}"#,
    /// )
    /// .unwrap();
    /// assert_eq!(token.transaction_id, "{ABC}");
    /// assert!(AuthorizationToken::from_blob("not json").is_err());
    /// ```
    pub fn from_blob(blob: &str) -> Result<Self> {
        serde_json::from_str(blob)
            .map_err(|e| SagePayError::ValidationError(format!("malformed authorization: {e}")))
    }
}

/// Data needed to redirect the cardholder to their issuer for 3-D Secure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreeDSecureChallenge {
    /// Issuer access control server URL.
    pub acs_url: String,
    /// Merchant data, echoed back to the 3-D Secure callback.
    pub md: String,
    /// Payer authentication request, posted to the ACS.
    pub pa_req: String,
}

/// Outcome of a gateway call.
///
/// A declined or unreadable answer is still a `GatewayResult`; check
/// [`success`](Self::success).
#[derive(Debug, Clone)]
pub struct GatewayResult {
    /// True only when `Status` is `OK`.
    pub success: bool,
    /// `StatusDetail`, else `Status`, else [`NO_STATUS_MESSAGE`].
    pub message: String,
    /// The fields that were sent, with card data masked.
    pub request: GatewayFieldMap,
    /// Decoded response pairs.
    pub response: ParsedResponse,
    /// Response body as received.
    pub raw_response: String,
    /// True when the merchant is not in the live environment.
    pub test: bool,
    /// Present when the response carries both `VPSTxId` and `SecurityKey`.
    pub authorization: Option<AuthorizationToken>,
}

impl GatewayResult {
    /// Returns the 3-D Secure challenge if the gateway asked for one.
    #[must_use]
    pub fn three_d_secure(&self) -> Option<ThreeDSecureChallenge> {
        if self.response.status() != Some(STATUS_3D_AUTH) {
            return None;
        }

        Some(ThreeDSecureChallenge {
            acs_url: self.response.get("ACSURL")?.to_owned(),
            md: self.response.get("MD")?.to_owned(),
            pa_req: self.response.get("PAReq")?.to_owned(),
        })
    }
}

/// Builds a [`GatewayResult`] from a decoded response.
///
/// `request` is redacted before it is stored.
#[must_use]
pub fn interpret(
    parsed: ParsedResponse,
    raw_response: String,
    request: &GatewayFieldMap,
    merchant: &MerchantConfig,
) -> GatewayResult {
    let success = parsed.status() == Some(STATUS_OK);

    let message = parsed
        .status_detail()
        .or_else(|| parsed.status())
        .unwrap_or(NO_STATUS_MESSAGE)
        .to_owned();

    let authorization = match (parsed.transaction_id(), parsed.security_key()) {
        (Some(transaction_id), Some(security_key)) => Some(AuthorizationToken {
            transaction_id: transaction_id.to_owned(),
            security_key: security_key.to_owned(),
            vendor_tx_code: merchant.login.clone(),
        }),
        _ => None,
    };

    debug!(
        success,
        status = parsed.status().unwrap_or_default(),
        has_authorization = authorization.is_some(),
        "interpreted gateway response"
    );

    GatewayResult {
        success,
        message,
        request: security::redact_request(request),
        response: parsed,
        raw_response,
        test: merchant.environment.is_test(),
        authorization,
    }
}
