//! Gateway client.
//!
//! [`GatewayClient`] owns the merchant configuration and a [`Transport`],
//! and runs the Build → Submit → Parse → Result sequence for each call. It
//! never retries and keeps no per-call state.

use std::fmt;

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::{
    config::{GatewayConfig, MerchantConfig},
    endpoint::{ConfigurableEndpointResolver, EndpointKind, EndpointResolver},
    error::Result,
    models::{Card, PurchaseOptions},
    request::{GatewayFieldMap, RequestBuilder, fields},
    response::{self, GatewayResult, LenientInterpreter, ResponseInterpreter},
    transport::{HttpTransport, Transport},
};

/// Generates a random identifier suitable for a `VendorTxCode`.
///
/// 32 lowercase hex characters (a UUID v4 without hyphens).
///
/// # Examples
///
/// ```
/// let id = sagepay_direct::client::generate_unique_id();
/// assert_eq!(id.len(), 32);
/// ```
#[must_use]
pub fn generate_unique_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Client for the Sage Pay Direct protocol.
///
/// The client is `Send + Sync` when its transport is, and can be shared
/// between tasks behind an `Arc`.
///
/// # Examples
///
/// ```rust,no_run
/// use rust_decimal::Decimal;
/// use sagepay_direct::{
///     client::{GatewayClient, generate_unique_id},
///     config::{Environment, GatewayConfig, MerchantConfig},
///     models::{Address, Card, PurchaseOptions},
/// };
///
/// # async fn example() -> sagepay_direct::error::Result<()> {
/// let config = GatewayConfig::new(MerchantConfig::new("testvendor", Environment::Simulator));
/// let client = GatewayClient::new(config)?;
///
/// let card = Card {
///     holder_name: "John Doe".to_owned(),
///     number: "4929000000006".to_owned(),
///     expiry_month: 1,
///     expiry_year: 2030,
///     verification_value: "123".to_owned(),
///     brand: "visa".to_owned(),
/// };
/// let options = PurchaseOptions::new(format!("REF{}", generate_unique_id()))
///     .with_description("Test transaction")
///     .with_billing_address(Address {
///         name: "Cosmo Kramer".to_owned(),
///         line1: "1234 Street".to_owned(),
///         city: "Seattle".to_owned(),
///         state: Some("WA".to_owned()),
///         postal_code: "98004".to_owned(),
///         country: "US".to_owned(),
///         ..Default::default()
///     });
///
/// let result = client.purchase(Decimal::new(799, 2), &card, &options).await?;
/// println!("{}: {}", result.success, result.message);
/// # Ok(())
/// # }
/// ```
pub struct GatewayClient<T = HttpTransport> {
    merchant: MerchantConfig,
    transport: T,
    resolver: Box<dyn EndpointResolver>,
    interpreter: Box<dyn ResponseInterpreter>,
}

impl<T: fmt::Debug> fmt::Debug for GatewayClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("merchant", &self.merchant)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl GatewayClient<HttpTransport> {
    /// Creates a client with the reqwest-backed transport described by
    /// `config.transport`.
    ///
    /// # Errors
    ///
    /// Returns `SagePayError::ConfigurationError` if the configuration is
    /// invalid, or an HTTP error if the client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::with_config(&config.transport)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> GatewayClient<T> {
    /// Creates a client with a caller-supplied transport.
    ///
    /// `config.transport` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `SagePayError::ConfigurationError` if the configuration is
    /// invalid.
    pub fn with_transport(config: GatewayConfig, transport: T) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            resolver: Box::new(ConfigurableEndpointResolver::new(&config.endpoints)),
            interpreter: Box::new(LenientInterpreter::new()),
            merchant: config.merchant,
            transport,
        })
    }

    /// Replaces the endpoint resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl EndpointResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Replaces the response interpreter.
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: impl ResponseInterpreter + 'static) -> Self {
        self.interpreter = Box::new(interpreter);
        self
    }

    /// Returns the merchant configuration.
    #[must_use]
    pub const fn merchant(&self) -> &MerchantConfig {
        &self.merchant
    }

    /// Returns the URL for `kind` in the configured environment.
    #[must_use]
    pub fn url_for(&self, kind: EndpointKind) -> String {
        self.resolver.resolve(kind, self.merchant.environment)
    }

    /// Returns the URL for an endpoint given by name (`gateway` or
    /// `3dcallback`).
    ///
    /// # Errors
    ///
    /// Returns `SagePayError::ConfigurationError` for any other name.
    pub fn endpoint_url(&self, name: &str) -> Result<String> {
        Ok(self.url_for(name.parse()?))
    }

    /// Charges `card` for `amount`.
    ///
    /// A declined payment is `Ok` with `success == false`. So is a request
    /// for 3-D Secure authentication; see
    /// [`GatewayResult::three_d_secure`].
    ///
    /// # Errors
    ///
    /// - `SagePayError::ValidationError` or `SagePayError::UnsupportedBrandError`
    ///   if the request cannot be built (nothing is sent)
    /// - `SagePayError::TransportError` or `SagePayError::HttpError` if the
    ///   gateway cannot be reached
    #[instrument(
        skip_all,
        fields(
            vendor_tx_code = options.order_id.as_deref().unwrap_or_default(),
            amount = %amount,
            card = %card.last_four(),
        )
    )]
    pub async fn purchase(
        &self,
        amount: Decimal,
        card: &Card,
        options: &PurchaseOptions,
    ) -> Result<GatewayResult> {
        let request = RequestBuilder::new(&self.merchant).build(amount, card, options)?;
        self.commit(&request, EndpointKind::Gateway).await
    }

    /// Completes a 3-D Secure authentication.
    ///
    /// `md` and `pa_res` are the values the issuer posted back to the
    /// merchant's return URL.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the gateway cannot be reached.
    #[instrument(skip_all)]
    pub async fn complete_authentication(&self, md: &str, pa_res: &str) -> Result<GatewayResult> {
        let mut request = GatewayFieldMap::new();
        request.insert(fields::MD, md);
        request.insert(fields::PA_RES, pa_res);

        self.commit(&request, EndpointKind::ThreeDSecureCallback).await
    }

    /// Sends `request` to the endpoint for `kind` and interprets the answer.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the gateway cannot be reached or answers
    /// with a non-success HTTP status.
    #[instrument(
        skip(self, request),
        fields(
            endpoint = %kind,
            environment = %self.merchant.environment,
            vendor_tx_code = request.get(fields::VENDOR_TX_CODE).unwrap_or_default(),
        )
    )]
    pub async fn commit(
        &self,
        request: &GatewayFieldMap,
        kind: EndpointKind,
    ) -> Result<GatewayResult> {
        let url = self.url_for(kind);
        let mut body = request.to_form_body();

        let sent = self.transport.post_form(&url, &body).await;
        body.zeroize();

        let raw = sent.inspect_err(|e| warn!(error = %e, "gateway request failed"))?;

        let parsed = self.interpreter.parse(&raw);
        let result = response::interpret(parsed, raw, request, &self.merchant);

        info!(success = result.success, status_message = %result.message, "gateway call completed");

        Ok(result)
    }
}
