//! Payment data supplied by the caller.
//!
//! These types carry generic card, address and order data. They know nothing
//! about gateway field names; [`RequestBuilder`](crate::request::RequestBuilder)
//! does that translation.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use zeroize::Zeroize;

use crate::error::{Result, SagePayError};

/// Gateway display name.
pub const DISPLAY_NAME: &str = "Sage Pay";

/// Gateway homepage.
pub const HOMEPAGE_URL: &str = "http://www.sagepay.co.uk/";

/// Countries in which the gateway accepts merchant accounts (ISO 3166-1 alpha-2).
const SUPPORTED_COUNTRIES: &[&str] = &[
    "HK", "US", "GB", "AU", "AD", "BE", "CH", "CY", "CZ", "DE", "DK", "ES", "FI", "FR", "GI", "GR",
    "HU", "IE", "IL", "IT", "LI", "LU", "MC", "MT", "NL", "NO", "NZ", "PL", "PT", "SE", "SG", "SI",
    "SM", "TR", "UM", "VA",
];

/// Returns the countries in which the gateway operates.
///
/// Informational only; the request builder does not enforce it.
#[must_use]
pub fn supported_countries() -> &'static [&'static str] {
    SUPPORTED_COUNTRIES
}

/// Card brands known to the client.
///
/// Parsed from the generic brand names used by card validators
/// (`visa`, `master`, `american_express`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardBrand {
    /// Visa.
    Visa,
    /// Mastercard.
    Master,
    /// American Express.
    AmericanExpress,
    /// Discover.
    Discover,
    /// Maestro.
    Maestro,
    /// Diners Club.
    DinersClub,
    /// JCB.
    Jcb,
}

impl CardBrand {
    /// All brands the client recognises, in display order.
    pub const ALL: [Self; 7] = [
        Self::Visa,
        Self::Master,
        Self::AmericanExpress,
        Self::Discover,
        Self::Maestro,
        Self::DinersClub,
        Self::Jcb,
    ];

    /// Returns the generic brand name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Master => "master",
            Self::AmericanExpress => "american_express",
            Self::Discover => "discover",
            Self::Maestro => "maestro",
            Self::DinersClub => "diners_club",
            Self::Jcb => "jcb",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardBrand {
    type Err = SagePayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|brand| brand.as_str() == s)
            .ok_or_else(|| SagePayError::UnsupportedBrandError(s.to_owned()))
    }
}

/// Credit or debit card used for a single purchase.
///
/// The card is expected to have passed Luhn and expiry checks before it
/// reaches this crate. Only the brand is checked here.
///
/// # Security
///
/// - The card number and verification value are zeroized on drop
/// - `Debug` output masks the number and omits the verification value
///
/// # Examples
///
/// ```
/// use sagepay_direct::models::Card;
///
/// let card = Card {
///     holder_name: "John Doe".to_owned(),
///     number: "4929000000006".to_owned(),
///     expiry_month: 1,
///     expiry_year: 2030,
///     verification_value: "123".to_owned(),
///     brand: "visa".to_owned(),
/// };
///
/// assert_eq!(card.last_four(), "0006");
/// assert!(!format!("{card:?}").contains("4929000000006"));
/// ```
#[derive(Clone)]
pub struct Card {
    /// Cardholder name as printed on the card.
    pub holder_name: String,
    /// Card number (PAN).
    pub number: String,
    /// Expiry month (1-12).
    pub expiry_month: u32,
    /// Four-digit expiry year.
    pub expiry_year: i32,
    /// Card verification value (CV2/CVC).
    pub verification_value: String,
    /// Generic brand name, e.g. `visa` or `american_express`.
    pub brand: String,
}

impl Card {
    /// Returns the last four digits of the card number for display.
    #[must_use]
    #[allow(clippy::string_slice, reason = "card numbers are ASCII digits")]
    pub fn last_four(&self) -> &str {
        if self.number.len() >= 4 && self.number.is_ascii() {
            &self.number[self.number.len() - 4..]
        } else {
            &self.number
        }
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("holder_name", &self.holder_name)
            .field("number", &format_args!("****{}", self.last_four()))
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("brand", &self.brand)
            .finish_non_exhaustive()
    }
}

impl Drop for Card {
    fn drop(&mut self) {
        self.number.zeroize();
        self.verification_value.zeroize();
    }
}

/// Postal address used for billing or delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Address {
    /// Full name, e.g. "Cosmo Kramer".
    pub name: String,
    /// First address line.
    pub line1: String,
    /// Second address line.
    #[serde(default)]
    pub line2: Option<String>,
    /// City or town.
    pub city: String,
    /// State or county (required by the gateway for US addresses).
    #[serde(default)]
    pub state: Option<String>,
    /// Postal or ZIP code.
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
}

impl Address {
    /// Splits [`name`](Self::name) into first and last name.
    ///
    /// The first whitespace-delimited token is the first name and the
    /// remainder is the last name. Returns `None` when the name has fewer
    /// than two tokens.
    ///
    /// # Examples
    ///
    /// ```
    /// use sagepay_direct::models::Address;
    ///
    /// let address = Address { name: "Cosmo Kramer".to_owned(), ..Default::default() };
    /// assert_eq!(address.split_name(), Some(("Cosmo", "Kramer")));
    ///
    /// let address = Address { name: "Madonna".to_owned(), ..Default::default() };
    /// assert_eq!(address.split_name(), None);
    /// ```
    #[must_use]
    pub fn split_name(&self) -> Option<(&str, &str)> {
        let (first, rest) = self.name.trim_start().split_once(char::is_whitespace)?;
        let last = rest.trim();
        if last.is_empty() { None } else { Some((first, last)) }
    }
}

/// Per-purchase options.
///
/// `order_id` and `billing_address` are required; they are optional here so
/// that a missing value surfaces as a [`SagePayError::ValidationError`] from
/// the builder rather than a construction-time panic.
///
/// # Examples
///
/// ```
/// use sagepay_direct::models::{Address, PurchaseOptions};
///
/// let options = PurchaseOptions::new("REF-1001")
///     .with_description("Test transaction")
///     .with_billing_address(Address {
///         name: "Cosmo Kramer".to_owned(),
///         line1: "1234 Street".to_owned(),
///         city: "Seattle".to_owned(),
///         postal_code: "98004".to_owned(),
///         country: "US".to_owned(),
///         state: Some("WA".to_owned()),
///         ..Default::default()
///     });
///
/// assert_eq!(options.order_id.as_deref(), Some("REF-1001"));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseOptions {
    /// Caller-supplied unique transaction reference.
    pub order_id: Option<String>,
    /// Free-text description of the goods.
    #[serde(default)]
    pub description: Option<String>,
    /// Currency override; falls back to the merchant default.
    #[serde(default)]
    pub currency: Option<String>,
    /// Billing address.
    pub billing_address: Option<Address>,
    /// Delivery address; falls back to the billing address.
    #[serde(default)]
    pub delivery_address: Option<Address>,
    /// Customer IP address.
    #[serde(default)]
    pub client_ip: Option<String>,
}

impl PurchaseOptions {
    /// Creates options for the given order id.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn new(order_id: impl Into<String>) -> Self {
        Self { order_id: Some(order_id.into()), ..Self::default() }
    }

    /// Sets the description.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides the merchant default currency.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Sets the billing address.
    #[must_use]
    pub fn with_billing_address(mut self, address: Address) -> Self {
        self.billing_address = Some(address);
        self
    }

    /// Sets a delivery address distinct from the billing address.
    #[must_use]
    pub fn with_delivery_address(mut self, address: Address) -> Self {
        self.delivery_address = Some(address);
        self
    }

    /// Sets the customer IP address.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }
}
