//! Gateway configuration types.
//!
//! This module defines TOML-deserializable configuration for a merchant
//! account: credentials, environment selection, protocol profile, endpoint
//! overrides and transport settings.
//!
//! Configuration is read once, validated, and then owned immutably by the
//! [`GatewayClient`](crate::client::GatewayClient). Nothing here consults
//! process state after loading.
//!
//! # Examples
//!
//! ```toml
//! [merchant]
//! login = "testvendor"
//! environment = "simulator"
//! default_currency = "GBP"
//!
//! [merchant.profile]
//! protocol_version = "2.23"
//! send_client_ip = false
//!
//! [transport]
//! timeout_secs = 20
//! ```

use std::{fmt, path::Path};

use serde::Deserialize;
use url::Url;

use crate::{
    error::{Result, SagePayError},
    transport::HttpConfig,
};

/// Protocol version sent in every purchase request.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2.23";

/// Currency used when neither the merchant nor the purchase names one.
pub const DEFAULT_CURRENCY: &str = "GBP";

/// Gateway environment.
///
/// Selected explicitly at construction; never inferred from the process
/// environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Vendor test server.
    #[default]
    Test,
    /// Gateway simulator.
    Simulator,
    /// Production.
    Live,
}

impl Environment {
    /// Returns true for every environment that does not move real money.
    #[must_use]
    pub const fn is_test(self) -> bool {
        matches!(self, Self::Test | Self::Simulator)
    }

    /// Returns the environment name as used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Simulator => "simulator",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol differences between historical integrations.
///
/// Older integrations disagree on whether a password is required and on
/// which optional fields are sent; these switches cover those differences.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProtocolProfile {
    /// Value of the `VPSProtocol` field.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,

    /// Reject configurations without a password.
    #[serde(default)]
    pub require_password: bool,

    /// Send `Description` when the purchase has one.
    #[serde(default = "default_true")]
    pub send_description: bool,

    /// Send `ClientIPAddress` when the purchase has one.
    #[serde(default = "default_true")]
    pub send_client_ip: bool,
}

impl Default for ProtocolProfile {
    fn default() -> Self {
        Self {
            protocol_version: default_protocol_version(),
            require_password: false,
            send_description: true,
            send_client_ip: true,
        }
    }
}

/// Merchant account configuration.
///
/// Credentials may be given inline or by naming environment variables with
/// `login_env` / `password_env`. The variables are read once, when the
/// configuration is loaded through [`GatewayConfig::from_toml`].
#[derive(Clone, Deserialize)]
pub struct MerchantConfig {
    /// Vendor login name, sent as `Vendor`.
    #[serde(default)]
    pub login: String,

    /// Environment variable holding the login.
    #[serde(default)]
    pub login_env: Option<String>,

    /// Account password, required by some protocol profiles.
    #[serde(default)]
    pub password: Option<String>,

    /// Environment variable holding the password.
    #[serde(default)]
    pub password_env: Option<String>,

    /// Currency used when the purchase does not override it.
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Gateway environment.
    #[serde(default)]
    pub environment: Environment,

    /// Protocol profile.
    #[serde(default)]
    pub profile: ProtocolProfile,
}

impl fmt::Debug for MerchantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantConfig")
            .field("login", &self.login)
            .field("login_env", &self.login_env)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("password_env", &self.password_env)
            .field("default_currency", &self.default_currency)
            .field("environment", &self.environment)
            .field("profile", &self.profile)
            .finish()
    }
}

impl MerchantConfig {
    /// Creates a configuration for the given login and environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use sagepay_direct::config::{Environment, MerchantConfig};
    ///
    /// let config = MerchantConfig::new("testvendor", Environment::Simulator);
    /// assert_eq!(config.default_currency, "GBP");
    /// assert!(config.validate().is_ok());
    /// ```
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn new(login: impl Into<String>, environment: Environment) -> Self {
        Self {
            login: login.into(),
            login_env: None,
            password: None,
            password_env: None,
            default_currency: default_currency(),
            environment,
            profile: ProtocolProfile::default(),
        }
    }

    /// Sets the password.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the default currency.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    /// Sets the protocol profile.
    #[must_use]
    pub fn with_profile(mut self, profile: ProtocolProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Fills empty credentials from the environment variables named in
    /// `login_env` / `password_env`. Inline values win.
    ///
    /// # Errors
    ///
    /// Returns `SagePayError::ConfigurationError` if a variable name is
    /// malformed or the variable is not set.
    pub fn resolve_credentials(&mut self) -> Result<()> {
        if self.login.is_empty()
            && let Some(ref name) = self.login_env
        {
            self.login = read_env_var(name)?;
        }

        if self.password.is_none()
            && let Some(ref name) = self.password_env
        {
            self.password = Some(read_env_var(name)?);
        }

        Ok(())
    }

    /// Validates the merchant configuration.
    ///
    /// This method checks for:
    /// - Non-empty login
    /// - Password present when the profile requires one
    /// - Three-letter alphabetic default currency
    /// - Non-empty protocol version
    ///
    /// # Errors
    ///
    /// Returns `SagePayError::ConfigurationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.login.trim().is_empty() {
            return Err(SagePayError::ConfigurationError("login is required".to_owned()));
        }

        if self.profile.require_password
            && self.password.as_deref().is_none_or(|p| p.is_empty())
        {
            return Err(SagePayError::ConfigurationError(
                "password is required by the protocol profile".to_owned(),
            ));
        }

        if !is_currency_code(&self.default_currency) {
            return Err(SagePayError::ConfigurationError(format!(
                "default_currency must be a three-letter code, got: {}",
                self.default_currency
            )));
        }

        if self.profile.protocol_version.trim().is_empty() {
            return Err(SagePayError::ConfigurationError(
                "protocol_version cannot be empty".to_owned(),
            ));
        }

        Ok(())
    }
}

/// Endpoint URL overrides.
///
/// Used to point the client at a private simulator. When unset, the
/// built-in URL for the configured environment is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EndpointConfig {
    /// Purchase endpoint URL.
    pub gateway: Option<String>,

    /// 3-D Secure callback endpoint URL.
    pub three_d_secure_callback: Option<String>,
}

impl EndpointConfig {
    /// Validates endpoint overrides.
    ///
    /// Checks that every override:
    /// - Parses as a URL
    /// - Uses HTTPS
    /// - Does not point to localhost or a loopback address
    ///
    /// # Errors
    ///
    /// Returns `SagePayError::ConfigurationError` if any override is invalid.
    pub fn validate(&self) -> Result<()> {
        let endpoints = [
            ("gateway", &self.gateway),
            ("three_d_secure_callback", &self.three_d_secure_callback),
        ];

        for (name, endpoint) in endpoints {
            if let Some(url) = endpoint {
                validate_endpoint_url(name, url)?;
            }
        }

        Ok(())
    }
}

/// Root configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Merchant account.
    pub merchant: MerchantConfig,

    /// Endpoint overrides.
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// HTTP transport settings.
    #[serde(default)]
    pub transport: HttpConfig,
}

impl GatewayConfig {
    /// Wraps a merchant configuration with default endpoints and transport.
    #[must_use]
    pub fn new(merchant: MerchantConfig) -> Self {
        Self { merchant, endpoints: EndpointConfig::default(), transport: HttpConfig::default() }
    }

    /// Parses, resolves and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing, credential resolution or validation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use sagepay_direct::config::{Environment, GatewayConfig};
    ///
    /// let toml = r#"
    ///     [merchant]
    ///     login = "testvendor"
    ///     environment = "live"
    /// "#;
    ///
    /// let config = GatewayConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.merchant.environment, Environment::Live);
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(toml_str)
            .map_err(|e| SagePayError::ConfigurationError(format!("invalid TOML config: {e}")))?;
        config.merchant.resolve_credentials()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or [`from_toml`](Self::from_toml) fails.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SagePayError::ConfigurationError(format!("cannot read config file: {e}"))
        })?;
        Self::from_toml(&content)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn validate(&self) -> Result<()> {
        self.merchant.validate()?;
        self.endpoints.validate()?;
        self.transport.validate()?;
        Ok(())
    }
}

fn read_env_var(name: &str) -> Result<String> {
    validate_env_var_name(name)?;
    std::env::var(name).map_err(|_| {
        SagePayError::ConfigurationError(format!("environment variable {name} is not set"))
    })
}

/// Validates an environment variable name.
fn validate_env_var_name(name: &str) -> Result<()> {
    let Some(first_char) = name.chars().next() else {
        return Err(SagePayError::ConfigurationError(
            "environment variable name cannot be empty".to_owned(),
        ));
    };

    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(SagePayError::ConfigurationError(format!(
            "environment variable name must start with letter or underscore: {name}"
        )));
    }

    if let Some(ch) = name.chars().find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_') {
        return Err(SagePayError::ConfigurationError(format!(
            "environment variable name contains invalid character '{ch}': {name}"
        )));
    }

    Ok(())
}

/// Validates an endpoint override URL.
pub(crate) fn validate_endpoint_url(name: &str, url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|e| {
        SagePayError::ConfigurationError(format!("endpoint '{name}' is not a valid URL: {e}"))
    })?;

    if parsed.scheme() != "https" {
        return Err(SagePayError::ConfigurationError(format!(
            "endpoint '{name}' must use HTTPS, got: {}",
            parsed.scheme()
        )));
    }

    if let Some(host) = parsed.host_str() {
        let host_lower = host.to_lowercase();
        if host_lower == "localhost"
            || host_lower == "::1"
            || host_lower == "[::1]"
            || host_lower.starts_with("127.")
        {
            return Err(SagePayError::ConfigurationError(format!(
                "endpoint '{name}' must not be localhost or loopback: {host}"
            )));
        }
    }

    Ok(())
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

fn default_protocol_version() -> String {
    DEFAULT_PROTOCOL_VERSION.to_owned()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_owned()
}

const fn default_true() -> bool {
    true
}
