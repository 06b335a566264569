use proptest::prelude::*;
use rust_decimal::Decimal;

use super::{RequestBuilder, fields};
use crate::{
    config::{Environment, MerchantConfig},
    models::{Address, Card, CardBrand, PurchaseOptions},
};

fn brand() -> impl Strategy<Value = CardBrand> {
    prop::sample::select(vec![
        CardBrand::Visa,
        CardBrand::Master,
        CardBrand::Maestro,
        CardBrand::AmericanExpress,
        CardBrand::DinersClub,
        CardBrand::Jcb,
    ])
}

fn address() -> impl Strategy<Value = Address> {
    (
        "[A-Za-z]{1,12}( [A-Za-z]{1,12}){0,2}",
        "[A-Za-z0-9 ]{1,30}",
        proptest::option::of("[A-Za-z0-9 ]{1,30}"),
        "[A-Za-z ]{1,20}",
        proptest::option::of("[A-Z]{2}"),
        "[A-Z0-9 ]{3,8}",
        "[A-Z]{2}",
    )
        .prop_map(|(name, line1, line2, city, state, postal_code, country)| Address {
            name,
            line1,
            line2,
            city,
            state,
            postal_code,
            country,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_build_is_idempotent(
        cents in 1i64..10_000_000,
        month in 1u32..=12,
        year in 2000i32..2100,
        brand in brand(),
        order_id in "[A-Za-z0-9-]{1,40}",
        billing in address(),
        delivery in proptest::option::of(address()),
        description in proptest::option::of("[ -~]{0,100}"),
    ) {
        let merchant = MerchantConfig::new("testvendor", Environment::Test);
        let card = Card {
            holder_name: billing.name.clone(),
            number: "4929000000006".to_owned(),
            expiry_month: month,
            expiry_year: year,
            verification_value: "123".to_owned(),
            brand: brand.as_str().to_owned(),
        };
        let options = PurchaseOptions {
            order_id: Some(order_id),
            description,
            billing_address: Some(billing),
            delivery_address: delivery,
            ..Default::default()
        };
        let amount = Decimal::new(cents, 2);
        let builder = RequestBuilder::new(&merchant);

        let first = builder.build(amount, &card, &options);
        let second = builder.build(amount, &card, &options);
        prop_assert!(first.is_ok(), "build failed: {:?}", first.err());
        prop_assert!(second.is_ok());

        let (first, second) = (first.unwrap(), second.unwrap());
        prop_assert_eq!(&first, &second);
        prop_assert!(first.keys().eq(second.keys()));
    }

    #[test]
    fn test_required_fields_always_present(
        cents in 1i64..10_000_000,
        brand in brand(),
        billing in address(),
        delivery in proptest::option::of(address()),
    ) {
        let merchant = MerchantConfig::new("testvendor", Environment::Live);
        let card = Card {
            holder_name: "Longbob Longsen".to_owned(),
            number: "5404000000000001".to_owned(),
            expiry_month: 6,
            expiry_year: 2031,
            verification_value: "456".to_owned(),
            brand: brand.as_str().to_owned(),
        };
        let options = PurchaseOptions {
            order_id: Some("REF-PROP".to_owned()),
            billing_address: Some(billing),
            delivery_address: delivery,
            ..Default::default()
        };

        let map = RequestBuilder::new(&merchant).build(Decimal::new(cents, 2), &card, &options);
        prop_assert!(map.is_ok());
        let map = map.unwrap();

        for key in [fields::AMOUNT, fields::CURRENCY, fields::VENDOR_TX_CODE] {
            prop_assert!(map.contains_key(key), "missing {}", key);
        }
        for suffix in fields::ADDRESS_SUFFIXES {
            let key = format!("Delivery{suffix}");
            prop_assert!(map.contains_key(&key), "missing {}", key);
        }
    }
}
