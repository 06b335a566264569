//! Purchase request construction.
//!
//! [`RequestBuilder`] turns merchant configuration, an amount, a card and
//! per-purchase options into the ordered [`GatewayFieldMap`] the gateway
//! expects. It performs no I/O.
//!
//! # Field order
//!
//! 1. Protocol envelope: `VPSProtocol`, `TxType`, `Vendor`
//! 2. `Amount`, `Currency`
//! 3. `VendorTxCode`, optional `Description`
//! 4. `CardHolder`, `CardNumber`, `ExpiryDate`, `CV2`, `CardType`
//! 5. Eight `Billing*` address fields
//! 6. Eight `Delivery*` address fields (billing is reused when no delivery
//!    address is given)
//! 7. Optional `ClientIPAddress`
//!
//! # Examples
//!
//! ```
//! use rust_decimal::Decimal;
//! use sagepay_direct::{
//!     config::{Environment, MerchantConfig},
//!     models::{Address, Card, PurchaseOptions},
//!     request::RequestBuilder,
//! };
//!
//! let merchant = MerchantConfig::new("testvendor", Environment::Simulator);
//! let card = Card {
//!     holder_name: "Cosmo Kramer".to_owned(),
//!     number: "4929000000006".to_owned(),
//!     expiry_month: 1,
//!     expiry_year: 2030,
//!     verification_value: "123".to_owned(),
//!     brand: "visa".to_owned(),
//! };
//! let options = PurchaseOptions::new("REF-1").with_billing_address(Address {
//!     name: "Cosmo Kramer".to_owned(),
//!     line1: "1234 Street".to_owned(),
//!     city: "London".to_owned(),
//!     postal_code: "W1A 1AA".to_owned(),
//!     country: "GB".to_owned(),
//!     ..Default::default()
//! });
//!
//! let fields =
//!     RequestBuilder::new(&merchant).build(Decimal::new(799, 2), &card, &options).unwrap();
//! assert_eq!(fields.get("Amount"), Some("7.99"));
//! assert_eq!(fields.get("ExpiryDate"), Some("0130"));
//! assert_eq!(fields.get("DeliverySurname"), Some("Kramer"));
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    config::MerchantConfig,
    error::{Result, SagePayError},
    models::{Address, Card, PurchaseOptions},
};

pub mod brand;
pub mod field_map;

#[cfg(test)]
mod proptests;

pub use brand::{BRAND_CODES, brand_code, card_type_for, supported_brands};
pub use field_map::{GatewayFieldMap, fields};

/// Transaction type sent with every purchase.
pub const TX_TYPE_PAYMENT: &str = "PAYMENT";

/// Renders an amount the way the gateway expects it.
///
/// The amount must be positive with at most two decimal places. It is
/// rendered with exactly two.
///
/// # Errors
///
/// Returns `SagePayError::ValidationError` for zero, negative or
/// sub-penny amounts.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use sagepay_direct::request::format_amount;
///
/// assert_eq!(format_amount(Decimal::new(10, 0)).unwrap(), "10.00");
/// assert_eq!(format_amount(Decimal::new(799, 2)).unwrap(), "7.99");
/// assert!(format_amount(Decimal::new(7999, 3)).is_err());
/// ```
pub fn format_amount(amount: Decimal) -> Result<String> {
    if amount <= Decimal::ZERO {
        return Err(SagePayError::ValidationError(format!("amount must be positive, got {amount}")));
    }

    let mut rendered = amount.normalize();
    if rendered.scale() > 2 {
        return Err(SagePayError::ValidationError(format!(
            "amount has more than two decimal places: {amount}"
        )));
    }
    rendered.rescale(2);

    Ok(rendered.to_string())
}

/// Formats a card expiry as `MMYY`.
///
/// The value is derived from a real calendar date, so an impossible month
/// is rejected rather than padded.
///
/// # Errors
///
/// Returns `SagePayError::ValidationError` if the month is outside 1-12 or
/// the year is not four digits.
///
/// # Examples
///
/// ```
/// use sagepay_direct::request::format_expiry;
///
/// assert_eq!(format_expiry(1, 2025).unwrap(), "0125");
/// assert_eq!(format_expiry(12, 2030).unwrap(), "1230");
/// assert!(format_expiry(13, 2030).is_err());
/// ```
pub fn format_expiry(month: u32, year: i32) -> Result<String> {
    if !(1000..=9999).contains(&year) {
        return Err(SagePayError::ValidationError(format!(
            "card expiry year must have four digits, got {year}"
        )));
    }

    let date = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        SagePayError::ValidationError(format!("card expiry month must be 1-12, got {month}"))
    })?;

    Ok(date.format("%m%y").to_string())
}

fn insert_address(map: &mut GatewayFieldMap, prefix: &str, address: &Address) {
    // Single-token names leave both name fields empty.
    let (first, last) = address.split_name().unwrap_or_default();

    let values = [
        last,
        first,
        address.line1.as_str(),
        address.line2.as_deref().unwrap_or_default(),
        address.city.as_str(),
        address.postal_code.as_str(),
        address.country.as_str(),
        address.state.as_deref().unwrap_or_default(),
    ];

    for (suffix, value) in fields::ADDRESS_SUFFIXES.iter().zip(values) {
        map.insert(format!("{prefix}{suffix}"), value);
    }
}

/// Builds purchase requests for one merchant.
///
/// Stateless apart from the borrowed configuration: building twice from the
/// same inputs yields identical maps, key order included.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    merchant: &'a MerchantConfig,
}

impl<'a> RequestBuilder<'a> {
    /// Creates a builder for `merchant`.
    #[must_use]
    pub const fn new(merchant: &'a MerchantConfig) -> Self {
        Self { merchant }
    }

    /// Builds the purchase field map.
    ///
    /// # Errors
    ///
    /// - `SagePayError::ValidationError` if the order id or billing address is
    ///   missing, or the amount or expiry is invalid
    /// - `SagePayError::UnsupportedBrandError` if the card brand has no
    ///   gateway code
    pub fn build(
        &self,
        amount: Decimal,
        card: &Card,
        options: &PurchaseOptions,
    ) -> Result<GatewayFieldMap> {
        let order_id = options
            .order_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| SagePayError::ValidationError("order_id is required".to_owned()))?;
        let billing = options.billing_address.as_ref().ok_or_else(|| {
            SagePayError::ValidationError("billing_address is required".to_owned())
        })?;
        let card_type = card_type_for(&card.brand)?;
        let amount = format_amount(amount)?;
        let expiry = format_expiry(card.expiry_month, card.expiry_year)?;

        let profile = &self.merchant.profile;
        let currency = options.currency.as_deref().unwrap_or(&self.merchant.default_currency);

        let mut map = GatewayFieldMap::new();

        map.insert(fields::VPS_PROTOCOL, profile.protocol_version.as_str());
        map.insert(fields::TX_TYPE, TX_TYPE_PAYMENT);
        map.insert(fields::VENDOR, self.merchant.login.as_str());

        map.insert(fields::AMOUNT, amount);
        map.insert(fields::CURRENCY, currency);

        map.insert(fields::VENDOR_TX_CODE, order_id);
        if profile.send_description
            && let Some(description) = options.description.as_deref()
            && !description.is_empty()
        {
            map.insert(fields::DESCRIPTION, description);
        }

        map.insert(fields::CARD_HOLDER, card.holder_name.as_str());
        map.insert(fields::CARD_NUMBER, card.number.as_str());
        map.insert(fields::EXPIRY_DATE, expiry);
        map.insert(fields::CV2, card.verification_value.as_str());
        map.insert(fields::CARD_TYPE, card_type);

        insert_address(&mut map, "Billing", billing);
        insert_address(
            &mut map,
            "Delivery",
            options.delivery_address.as_ref().unwrap_or(billing),
        );

        if profile.send_client_ip
            && let Some(ip) = options.client_ip.as_deref()
            && !ip.is_empty()
        {
            map.insert(fields::CLIENT_IP_ADDRESS, ip);
        }

        debug!(
            vendor_tx_code = order_id,
            card = %card.last_four(),
            card_type,
            field_count = map.len(),
            "built purchase request"
        );

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, ProtocolProfile};

    fn merchant() -> MerchantConfig {
        MerchantConfig::new("testvendor", Environment::Simulator)
    }

    fn card(brand: &str) -> Card {
        Card {
            holder_name: "Longbob Longsen".to_owned(),
            number: "4929000000006".to_owned(),
            expiry_month: 9,
            expiry_year: 2030,
            verification_value: "123".to_owned(),
            brand: brand.to_owned(),
        }
    }

    fn billing() -> Address {
        Address {
            name: "Cosmo Kramer".to_owned(),
            line1: "1234 Street".to_owned(),
            line2: Some("Apt 5".to_owned()),
            city: "Seattle".to_owned(),
            state: Some("WA".to_owned()),
            postal_code: "98004".to_owned(),
            country: "US".to_owned(),
        }
    }

    fn options() -> PurchaseOptions {
        PurchaseOptions::new("REF-1001").with_billing_address(billing())
    }

    #[test]
    fn test_field_order() {
        let fields = RequestBuilder::new(&merchant())
            .build(Decimal::new(100, 0), &card("visa"), &options().with_client_ip("10.0.0.1"))
            .unwrap();

        let keys: Vec<_> = fields.keys().collect();
        assert_eq!(
            keys,
            [
                "VPSProtocol",
                "TxType",
                "Vendor",
                "Amount",
                "Currency",
                "VendorTxCode",
                "CardHolder",
                "CardNumber",
                "ExpiryDate",
                "CV2",
                "CardType",
                "BillingSurname",
                "BillingFirstnames",
                "BillingAddress1",
                "BillingAddress2",
                "BillingCity",
                "BillingPostCode",
                "BillingCountry",
                "BillingState",
                "DeliverySurname",
                "DeliveryFirstnames",
                "DeliveryAddress1",
                "DeliveryAddress2",
                "DeliveryCity",
                "DeliveryPostCode",
                "DeliveryCountry",
                "DeliveryState",
                "ClientIPAddress",
            ]
        );
    }

    #[test]
    fn test_envelope_and_payment_fields() {
        let fields = RequestBuilder::new(&merchant())
            .build(Decimal::new(799, 2), &card("visa"), &options())
            .unwrap();

        assert_eq!(fields.get("VPSProtocol"), Some("2.23"));
        assert_eq!(fields.get("TxType"), Some("PAYMENT"));
        assert_eq!(fields.get("Vendor"), Some("testvendor"));
        assert_eq!(fields.get("Amount"), Some("7.99"));
        assert_eq!(fields.get("Currency"), Some("GBP"));
        assert_eq!(fields.get("VendorTxCode"), Some("REF-1001"));
        assert_eq!(fields.get("CardHolder"), Some("Longbob Longsen"));
        assert_eq!(fields.get("CardNumber"), Some("4929000000006"));
        assert_eq!(fields.get("ExpiryDate"), Some("0930"));
        assert_eq!(fields.get("CV2"), Some("123"));
        assert_eq!(fields.get("CardType"), Some("VISA"));
    }

    #[test]
    fn test_billing_fields() {
        let fields = RequestBuilder::new(&merchant())
            .build(Decimal::ONE, &card("visa"), &options())
            .unwrap();

        assert_eq!(fields.get("BillingSurname"), Some("Kramer"));
        assert_eq!(fields.get("BillingFirstnames"), Some("Cosmo"));
        assert_eq!(fields.get("BillingAddress1"), Some("1234 Street"));
        assert_eq!(fields.get("BillingAddress2"), Some("Apt 5"));
        assert_eq!(fields.get("BillingCity"), Some("Seattle"));
        assert_eq!(fields.get("BillingPostCode"), Some("98004"));
        assert_eq!(fields.get("BillingCountry"), Some("US"));
        assert_eq!(fields.get("BillingState"), Some("WA"));
    }

    #[test]
    fn test_delivery_falls_back_to_billing() {
        let fields = RequestBuilder::new(&merchant())
            .build(Decimal::ONE, &card("visa"), &options())
            .unwrap();

        for suffix in fields::ADDRESS_SUFFIXES {
            assert_eq!(
                fields.get(&format!("Delivery{suffix}")),
                fields.get(&format!("Billing{suffix}")),
                "Delivery{suffix} should mirror billing"
            );
        }
    }

    #[test]
    fn test_delivery_address_used_when_present() {
        let delivery = Address {
            name: "Elaine Benes".to_owned(),
            line1: "16 W 75th St".to_owned(),
            city: "New York".to_owned(),
            postal_code: "10023".to_owned(),
            country: "US".to_owned(),
            ..Default::default()
        };
        let fields = RequestBuilder::new(&merchant())
            .build(Decimal::ONE, &card("visa"), &options().with_delivery_address(delivery))
            .unwrap();

        assert_eq!(fields.get("DeliverySurname"), Some("Benes"));
        assert_eq!(fields.get("DeliveryFirstnames"), Some("Elaine"));
        assert_eq!(fields.get("DeliveryCity"), Some("New York"));
        assert_eq!(fields.get("DeliveryAddress2"), Some(""));
        assert_eq!(fields.get("DeliveryState"), Some(""));
        assert_eq!(fields.get("BillingCity"), Some("Seattle"));
    }

    #[test]
    fn test_single_token_name_sends_empty_names() {
        let address = Address { name: "Madonna".to_owned(), ..billing() };
        let options = PurchaseOptions::new("REF-1").with_billing_address(address);

        let fields =
            RequestBuilder::new(&merchant()).build(Decimal::ONE, &card("visa"), &options).unwrap();

        assert_eq!(fields.get("BillingFirstnames"), Some(""));
        assert_eq!(fields.get("BillingSurname"), Some(""));
        assert_eq!(fields.get("DeliveryFirstnames"), Some(""));
        assert_eq!(fields.get("DeliverySurname"), Some(""));
    }

    #[test]
    fn test_currency_override() {
        let fields = RequestBuilder::new(&merchant())
            .build(Decimal::ONE, &card("visa"), &options().with_currency("EUR"))
            .unwrap();
        assert_eq!(fields.get("Currency"), Some("EUR"));

        let merchant = merchant().with_currency("USD");
        let fields =
            RequestBuilder::new(&merchant).build(Decimal::ONE, &card("visa"), &options()).unwrap();
        assert_eq!(fields.get("Currency"), Some("USD"));
    }

    #[test]
    fn test_description_omitted_when_absent() {
        let fields = RequestBuilder::new(&merchant())
            .build(Decimal::ONE, &card("visa"), &options())
            .unwrap();
        assert!(!fields.contains_key("Description"));
        assert!(!fields.contains_key("ClientIPAddress"));

        let fields = RequestBuilder::new(&merchant())
            .build(Decimal::ONE, &card("visa"), &options().with_description("Store purchase"))
            .unwrap();
        assert_eq!(fields.get("Description"), Some("Store purchase"));
    }

    #[test]
    fn test_profile_suppresses_optional_fields() {
        let profile = ProtocolProfile {
            send_description: false,
            send_client_ip: false,
            ..Default::default()
        };
        let merchant = merchant().with_profile(profile);
        let options = options().with_description("Store purchase").with_client_ip("10.0.0.1");

        let fields =
            RequestBuilder::new(&merchant).build(Decimal::ONE, &card("visa"), &options).unwrap();

        assert!(!fields.contains_key("Description"));
        assert!(!fields.contains_key("ClientIPAddress"));
    }

    #[test]
    fn test_protocol_version_from_profile() {
        let profile = ProtocolProfile { protocol_version: "2.22".to_owned(), ..Default::default() };
        let merchant = merchant().with_profile(profile);

        let fields =
            RequestBuilder::new(&merchant).build(Decimal::ONE, &card("visa"), &options()).unwrap();
        assert_eq!(fields.get("VPSProtocol"), Some("2.22"));
    }

    #[test]
    fn test_missing_order_id() {
        let options = PurchaseOptions { order_id: None, ..options() };
        let err = RequestBuilder::new(&merchant())
            .build(Decimal::ONE, &card("visa"), &options)
            .unwrap_err();
        assert!(matches!(err, SagePayError::ValidationError(ref m) if m.contains("order_id")));

        let options = PurchaseOptions { order_id: Some("  ".to_owned()), ..self::options() };
        assert!(matches!(
            RequestBuilder::new(&merchant()).build(Decimal::ONE, &card("visa"), &options),
            Err(SagePayError::ValidationError(_))
        ));
    }

    #[test]
    fn test_missing_billing_address() {
        let options = PurchaseOptions::new("REF-1");
        let err = RequestBuilder::new(&merchant())
            .build(Decimal::ONE, &card("visa"), &options)
            .unwrap_err();
        assert!(matches!(
            err,
            SagePayError::ValidationError(ref m) if m.contains("billing_address")
        ));
    }

    #[test]
    fn test_unsupported_brand() {
        for brand in ["unknown", "discover"] {
            let err = RequestBuilder::new(&merchant())
                .build(Decimal::ONE, &card(brand), &options())
                .unwrap_err();
            assert!(matches!(err, SagePayError::UnsupportedBrandError(_)), "brand {brand}");
        }
    }

    #[test]
    fn test_all_brand_codes() {
        for (brand, code) in BRAND_CODES {
            let fields = RequestBuilder::new(&merchant())
                .build(Decimal::ONE, &card(brand.as_str()), &options())
                .unwrap();
            assert_eq!(fields.get("CardType"), Some(*code));
        }
    }

    #[test]
    fn test_invalid_expiry_month() {
        let mut card = card("visa");
        card.expiry_month = 0;
        assert!(matches!(
            RequestBuilder::new(&merchant()).build(Decimal::ONE, &card, &options()),
            Err(SagePayError::ValidationError(_))
        ));
    }

    #[test]
    fn test_format_expiry() {
        assert_eq!(format_expiry(1, 2025).unwrap(), "0125");
        assert_eq!(format_expiry(12, 2030).unwrap(), "1230");
        assert_eq!(format_expiry(7, 2100).unwrap(), "0700");
        assert!(format_expiry(13, 2030).is_err());
        assert!(format_expiry(0, 2030).is_err());
        assert!(format_expiry(1, 25).is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(799, 2)).unwrap(), "7.99");
        assert_eq!(format_amount(Decimal::new(10, 0)).unwrap(), "10.00");
        assert_eq!(format_amount(Decimal::new(15, 1)).unwrap(), "1.50");
        assert_eq!(format_amount(Decimal::new(1000, 3)).unwrap(), "1.00");
        assert_eq!(format_amount(Decimal::new(123_456_789, 2)).unwrap(), "1234567.89");
    }

    #[test]
    fn test_format_amount_rejects_invalid() {
        for amount in [Decimal::ZERO, Decimal::new(-100, 2), Decimal::new(1001, 3)] {
            assert!(
                matches!(format_amount(amount), Err(SagePayError::ValidationError(_))),
                "amount {amount} should be rejected"
            );
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let merchant = merchant();
        let builder = RequestBuilder::new(&merchant);
        let first = builder.build(Decimal::new(2500, 2), &card("master"), &options()).unwrap();
        let second = builder.build(Decimal::new(2500, 2), &card("master"), &options()).unwrap();

        assert_eq!(first, second);
        assert!(first.keys().eq(second.keys()));
    }
}
