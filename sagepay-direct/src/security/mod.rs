//! Card data redaction.
//!
//! Raw card numbers and verification values leave the process only in the
//! form body sent to the gateway. Anything kept afterwards (the echoed
//! request inside a [`GatewayResult`](crate::response::GatewayResult), log
//! lines, `Debug` output) goes through this module first.
//!
//! # Examples
//!
//! ```
//! use sagepay_direct::{request::GatewayFieldMap, security::redact_request};
//!
//! let request: GatewayFieldMap =
//!     [("CardNumber", "4111111111111111"), ("CV2", "123"), ("Amount", "7.99")]
//!         .into_iter()
//!         .collect();
//!
//! let redacted = redact_request(&request);
//! assert_eq!(redacted.get("CardNumber"), Some("XXXXXXXXXXXX1111"));
//! assert_eq!(redacted.get("CV2"), Some("XXX"));
//! assert_eq!(redacted.get("Amount"), Some("7.99"));
//! ```

use std::borrow::Cow;

use crate::request::{GatewayFieldMap, fields};

/// Replacement for a verification value.
pub const MASKED_CV2: &str = "XXX";

const VISIBLE_DIGITS: usize = 4;

/// Masks all but the last four characters of a card number.
///
/// The output has the same length as the input. Numbers of four characters
/// or fewer are masked entirely.
///
/// # Examples
///
/// ```
/// use sagepay_direct::security::mask_card_number;
///
/// assert_eq!(mask_card_number("4111111111111111"), "XXXXXXXXXXXX1111");
/// assert_eq!(mask_card_number("123"), "XXX");
/// assert_eq!(mask_card_number(""), "");
/// ```
#[must_use]
pub fn mask_card_number(number: &str) -> String {
    let len = number.chars().count();
    if len <= VISIBLE_DIGITS {
        return "X".repeat(len);
    }

    let visible: String = number.chars().skip(len - VISIBLE_DIGITS).collect();
    format!("{}{visible}", "X".repeat(len - VISIBLE_DIGITS))
}

/// Returns true if `key` names a field that carries card secrets.
///
/// Field names are matched exactly, as the gateway spells them.
#[must_use]
pub fn is_sensitive_field(key: &str) -> bool {
    key == fields::CARD_NUMBER || key == fields::CV2
}

/// Returns the log-safe form of a single field value.
///
/// Values of non-sensitive fields are borrowed unchanged.
#[must_use]
pub fn redact_field<'a>(key: &str, value: &'a str) -> Cow<'a, str> {
    if !is_sensitive_field(key) {
        return Cow::Borrowed(value);
    }

    if key == fields::CARD_NUMBER {
        Cow::Owned(mask_card_number(value))
    } else {
        Cow::Borrowed(MASKED_CV2)
    }
}

/// Returns a copy of `request` with card secrets masked.
///
/// Key order is preserved.
#[must_use]
pub fn redact_request(request: &GatewayFieldMap) -> GatewayFieldMap {
    request.iter().map(|(key, value)| (key, redact_field(key, value).into_owned())).collect()
}
