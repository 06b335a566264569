//! Ordered gateway field map.
//!
//! The wire representation of a request before form encoding. Keys keep
//! insertion order: the live endpoint does not care, but simulator logs are
//! compared field by field.

use std::fmt;

use indexmap::IndexMap;
use url::form_urlencoded;
use zeroize::Zeroize;

use crate::security;

/// Gateway field names used outside the builder.
pub mod fields {
    /// Protocol version.
    pub const VPS_PROTOCOL: &str = "VPSProtocol";
    /// Transaction type.
    pub const TX_TYPE: &str = "TxType";
    /// Vendor login name.
    pub const VENDOR: &str = "Vendor";
    /// Caller-supplied transaction reference.
    pub const VENDOR_TX_CODE: &str = "VendorTxCode";
    /// Amount.
    pub const AMOUNT: &str = "Amount";
    /// Currency.
    pub const CURRENCY: &str = "Currency";
    /// Description.
    pub const DESCRIPTION: &str = "Description";
    /// Cardholder name.
    pub const CARD_HOLDER: &str = "CardHolder";
    /// Card number.
    pub const CARD_NUMBER: &str = "CardNumber";
    /// Expiry date (`MMYY`).
    pub const EXPIRY_DATE: &str = "ExpiryDate";
    /// Card verification value.
    pub const CV2: &str = "CV2";
    /// Gateway card-type code.
    pub const CARD_TYPE: &str = "CardType";
    /// Customer IP address.
    pub const CLIENT_IP_ADDRESS: &str = "ClientIPAddress";
    /// 3-D Secure merchant data.
    pub const MD: &str = "MD";
    /// 3-D Secure payer authentication response.
    pub const PA_RES: &str = "PARes";

    /// Address field suffixes, in wire order. Prefixed with `Billing` or
    /// `Delivery`.
    pub const ADDRESS_SUFFIXES: [&str; 8] =
        ["Surname", "Firstnames", "Address1", "Address2", "City", "PostCode", "Country", "State"];
}

/// Insertion-ordered map of gateway field names to values.
///
/// `Debug` output masks card data, and every value is zeroized when the map
/// is dropped.
///
/// # Examples
///
/// ```
/// use sagepay_direct::request::GatewayFieldMap;
///
/// let mut fields = GatewayFieldMap::new();
/// fields.insert("TxType", "PAYMENT");
/// fields.insert("Description", "Tea & biscuits");
///
/// assert_eq!(fields.to_form_body(), "TxType=PAYMENT&Description=Tea+%26+biscuits");
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GatewayFieldMap {
    fields: IndexMap<String, String>,
}

impl GatewayFieldMap {
    /// Creates an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, returning the previous value for the key.
    ///
    /// Re-inserting a key keeps its original position.
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(key.into(), value.into())
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns true if the map contains `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the map has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterates over field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Serializes the map as an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn to_form_body(&self) -> String {
        form_urlencoded::Serializer::new(String::new()).extend_pairs(self.iter()).finish()
    }
}

impl fmt::Debug for GatewayFieldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, v)| (k, security::redact_field(k, v))))
            .finish()
    }
}

impl Drop for GatewayFieldMap {
    fn drop(&mut self) {
        for value in self.fields.values_mut() {
            value.zeroize();
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GatewayFieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}
