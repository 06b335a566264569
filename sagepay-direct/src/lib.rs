//! Sage Pay Direct: server-to-server card payments.
//!
//! A client for the Sage Pay "Direct" protocol (VSP Direct 2.23). It builds
//! the form-encoded purchase request from merchant configuration, an amount,
//! a card and billing/delivery data, posts it over TLS, and turns the
//! gateway's plaintext `Key=Value` answer into a [`GatewayResult`].
//!
//! # Architecture
//!
//! ```text
//!  purchase(amount, card, options)        complete_authentication(md, pa_res)
//!            │                                       │
//!   ┌────────▼────────┐                              │
//!   │ RequestBuilder  │  ordered GatewayFieldMap     │
//!   └────────┬────────┘                              │
//!            └──────────────┬────────────────────────┘
//!                  ┌────────▼────────┐
//!                  │  GatewayClient  │  commit(fields, endpoint kind)
//!                  └────────┬────────┘
//!                  ┌────────▼────────┐
//!                  │    Transport    │  HTTPS POST (reqwest by default)
//!                  └────────┬────────┘
//!              ┌────────────▼────────────┐
//!              │   ResponseInterpreter   │  lenient Key=Value scan
//!              └────────────┬────────────┘
//!                     GatewayResult
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rust_decimal::Decimal;
//! use sagepay_direct::{
//!     GatewayClient, GatewayConfig,
//!     models::{Address, Card, PurchaseOptions},
//! };
//!
//! # async fn example() -> sagepay_direct::Result<()> {
//! let config = GatewayConfig::from_toml(
//!     r#"
//!     [merchant]
//!     login = "testvendor"
//!     environment = "simulator"
//!     "#,
//! )?;
//! let client = GatewayClient::new(config)?;
//!
//! let card = Card {
//!     holder_name: "John Doe".to_owned(),
//!     number: "4929000000006".to_owned(),
//!     expiry_month: 1,
//!     expiry_year: 2030,
//!     verification_value: "123".to_owned(),
//!     brand: "visa".to_owned(),
//! };
//! let options = PurchaseOptions::new("REF-1001").with_billing_address(Address {
//!     name: "Cosmo Kramer".to_owned(),
//!     line1: "1234 Street".to_owned(),
//!     city: "Seattle".to_owned(),
//!     postal_code: "98004".to_owned(),
//!     country: "US".to_owned(),
//!     state: Some("WA".to_owned()),
//!     ..Default::default()
//! });
//!
//! let result = client.purchase(Decimal::new(799, 2), &card, &options).await?;
//! if let Some(challenge) = result.three_d_secure() {
//!     println!("redirect cardholder to {}", challenge.acs_url);
//! } else {
//!     println!("{} ({})", result.message, result.success);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Only missing input, bad configuration and transport failures are
//! errors ([`SagePayError`]). A declined card is a successful call whose
//! result has `success == false`.
//!
//! # Security
//!
//! - HTTPS only, with configurable timeouts
//! - Card number and CV2 are zeroized on drop and masked in `Debug` output
//! - The request echoed back in [`GatewayResult`] is redacted

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest"
)]

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod request;
pub mod response;
pub mod security;
pub mod transport;

pub use client::GatewayClient;
pub use config::{Environment, GatewayConfig, MerchantConfig};
pub use error::{Result, SagePayError};
pub use request::{GatewayFieldMap, RequestBuilder};
pub use response::{GatewayResult, LenientInterpreter, ResponseInterpreter};
