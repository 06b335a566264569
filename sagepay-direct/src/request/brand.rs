//! Card brand to gateway card-type code table.

use crate::{
    error::{Result, SagePayError},
    models::CardBrand,
};

/// Gateway `CardType` codes, keyed by brand.
///
/// Brands absent from this table are recognised but cannot be charged
/// through the gateway.
pub const BRAND_CODES: &[(CardBrand, &str)] = &[
    (CardBrand::Visa, "VISA"),
    (CardBrand::Master, "MC"),
    (CardBrand::Maestro, "MAESTRO"),
    (CardBrand::AmericanExpress, "AMEX"),
    (CardBrand::DinersClub, "DC"),
    (CardBrand::Jcb, "JCB"),
];

/// Returns the gateway code for `brand`, if it has one.
#[must_use]
pub fn brand_code(brand: CardBrand) -> Option<&'static str> {
    BRAND_CODES.iter().find(|(b, _)| *b == brand).map(|(_, code)| *code)
}

/// Resolves a generic brand name (`visa`, `master`, ...) to its gateway code.
///
/// # Errors
///
/// Returns `SagePayError::UnsupportedBrandError` if the name is unknown or
/// the brand has no gateway code.
///
/// # Examples
///
/// ```
/// use sagepay_direct::request::card_type_for;
///
/// assert_eq!(card_type_for("american_express").unwrap(), "AMEX");
/// assert!(card_type_for("discover").is_err());
/// ```
pub fn card_type_for(name: &str) -> Result<&'static str> {
    let brand: CardBrand = name.parse()?;
    brand_code(brand).ok_or_else(|| SagePayError::UnsupportedBrandError(name.to_owned()))
}

/// Brands that can be charged through the gateway.
pub fn supported_brands() -> impl Iterator<Item = CardBrand> {
    BRAND_CODES.iter().map(|(brand, _)| *brand)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_codes() {
        assert_eq!(card_type_for("visa").unwrap(), "VISA");
        assert_eq!(card_type_for("master").unwrap(), "MC");
        assert_eq!(card_type_for("maestro").unwrap(), "MAESTRO");
        assert_eq!(card_type_for("american_express").unwrap(), "AMEX");
        assert_eq!(card_type_for("diners_club").unwrap(), "DC");
        assert_eq!(card_type_for("jcb").unwrap(), "JCB");
    }

    #[test]
    fn test_discover_has_no_code() {
        assert_eq!(brand_code(CardBrand::Discover), None);
        let err = card_type_for("discover").unwrap_err();
        assert!(matches!(err, SagePayError::UnsupportedBrandError(ref b) if b == "discover"));
    }

    #[test]
    fn test_unknown_brand() {
        assert!(matches!(card_type_for("unknown"), Err(SagePayError::UnsupportedBrandError(_))));
        assert!(matches!(card_type_for("VISA"), Err(SagePayError::UnsupportedBrandError(_))));
    }

    #[test]
    fn test_supported_brands_excludes_discover() {
        let brands: Vec<_> = supported_brands().collect();
        assert_eq!(brands.len(), 6);
        assert!(!brands.contains(&CardBrand::Discover));
    }
}
