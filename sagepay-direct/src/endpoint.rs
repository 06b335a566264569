//! Endpoint resolution.
//!
//! The gateway exposes two endpoints, each in three environments. This
//! module maps an ([`EndpointKind`], [`Environment`]) pair to a URL.

use std::{fmt, str::FromStr};

use crate::{
    config::{EndpointConfig, Environment},
    error::{Result, SagePayError},
};

/// Simulator purchase endpoint.
pub const SIMULATOR_URL: &str = "https://test.sagepay.com/Simulator/VSPDirectGateway.asp";
/// Test purchase endpoint.
pub const TEST_URL: &str = "https://test.sagepay.com/gateway/service/vspdirect-register.vsp";
/// Live purchase endpoint.
pub const LIVE_URL: &str = "https://live.sagepay.com/gateway/service/vspdirect-register.vsp";

/// Simulator 3-D Secure callback endpoint.
pub const SIMULATOR_3D_URL: &str = "https://test.sagepay.com/Simulator/VSPDirectCallback.asp";
/// Test 3-D Secure callback endpoint.
pub const TEST_3D_URL: &str = "https://test.sagepay.com/gateway/service/direct3dcallback.vsp";
/// Live 3-D Secure callback endpoint.
pub const LIVE_3D_URL: &str = "https://live.sagepay.com/gateway/service/direct3dcallback.vsp";

/// Gateway endpoint kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    /// Purchase registration.
    Gateway,
    /// 3-D Secure authentication completion.
    ThreeDSecureCallback,
}

impl EndpointKind {
    /// Returns the endpoint name used in logs and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::ThreeDSecureCallback => "3dcallback",
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointKind {
    type Err = SagePayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gateway" => Ok(Self::Gateway),
            "3dcallback" => Ok(Self::ThreeDSecureCallback),
            other => Err(SagePayError::ConfigurationError(format!(
                "The endpoint '{other}' is unrecognised"
            ))),
        }
    }
}

/// Resolves the URL for an endpoint.
pub trait EndpointResolver: Send + Sync {
    /// Returns the URL for `kind` in `environment`.
    fn resolve(&self, kind: EndpointKind, environment: Environment) -> String;
}

/// Resolver backed by the built-in URL table.
#[derive(Debug, Clone, Default)]
pub struct DefaultEndpointResolver;

impl DefaultEndpointResolver {
    /// Creates a new default endpoint resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the built-in URL for `kind` in `environment`.
    #[must_use]
    pub const fn url(kind: EndpointKind, environment: Environment) -> &'static str {
        match (kind, environment) {
            (EndpointKind::Gateway, Environment::Simulator) => SIMULATOR_URL,
            (EndpointKind::Gateway, Environment::Test) => TEST_URL,
            (EndpointKind::Gateway, Environment::Live) => LIVE_URL,
            (EndpointKind::ThreeDSecureCallback, Environment::Simulator) => SIMULATOR_3D_URL,
            (EndpointKind::ThreeDSecureCallback, Environment::Test) => TEST_3D_URL,
            (EndpointKind::ThreeDSecureCallback, Environment::Live) => LIVE_3D_URL,
        }
    }
}

impl EndpointResolver for DefaultEndpointResolver {
    fn resolve(&self, kind: EndpointKind, environment: Environment) -> String {
        Self::url(kind, environment).to_owned()
    }
}

/// Resolver that prefers configured overrides and falls back to the
/// built-in table.
#[derive(Debug, Clone)]
pub struct ConfigurableEndpointResolver {
    config: EndpointConfig,
}

impl ConfigurableEndpointResolver {
    /// Creates a new configurable endpoint resolver.
    #[must_use]
    pub fn new(config: &EndpointConfig) -> Self {
        Self { config: config.clone() }
    }
}

impl EndpointResolver for ConfigurableEndpointResolver {
    fn resolve(&self, kind: EndpointKind, environment: Environment) -> String {
        let configured = match kind {
            EndpointKind::Gateway => self.config.gateway.as_ref(),
            EndpointKind::ThreeDSecureCallback => self.config.three_d_secure_callback.as_ref(),
        };

        configured.map_or_else(
            || DefaultEndpointResolver::url(kind, environment).to_owned(),
            Clone::clone,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_resolver() {
        let resolver = DefaultEndpointResolver::new();

        assert_eq!(resolver.resolve(EndpointKind::Gateway, Environment::Simulator), SIMULATOR_URL);
        assert_eq!(resolver.resolve(EndpointKind::Gateway, Environment::Test), TEST_URL);
        assert_eq!(resolver.resolve(EndpointKind::Gateway, Environment::Live), LIVE_URL);
        assert_eq!(
            resolver.resolve(EndpointKind::ThreeDSecureCallback, Environment::Simulator),
            SIMULATOR_3D_URL
        );
        assert_eq!(
            resolver.resolve(EndpointKind::ThreeDSecureCallback, Environment::Test),
            TEST_3D_URL
        );
        assert_eq!(
            resolver.resolve(EndpointKind::ThreeDSecureCallback, Environment::Live),
            LIVE_3D_URL
        );
    }

    #[test]
    fn test_test_environments_never_hit_live() {
        for kind in [EndpointKind::Gateway, EndpointKind::ThreeDSecureCallback] {
            for env in [Environment::Test, Environment::Simulator] {
                assert!(DefaultEndpointResolver::url(kind, env).starts_with("https://test."));
            }
            let live = DefaultEndpointResolver::url(kind, Environment::Live);
            assert!(live.starts_with("https://live."));
        }
    }

    #[test]
    fn test_endpoint_kind_from_str() {
        assert_eq!("gateway".parse::<EndpointKind>().unwrap(), EndpointKind::Gateway);
        assert_eq!(
            "3dcallback".parse::<EndpointKind>().unwrap(),
            EndpointKind::ThreeDSecureCallback
        );
    }

    #[test]
    fn test_endpoint_kind_unrecognised() {
        let err = "refund".parse::<EndpointKind>().unwrap_err();
        assert!(matches!(err, SagePayError::ConfigurationError(_)));
        assert_eq!(err.to_string(), "Configuration error: The endpoint 'refund' is unrecognised");
    }

    #[test]
    fn test_endpoint_kind_display_roundtrip() {
        for kind in [EndpointKind::Gateway, EndpointKind::ThreeDSecureCallback] {
            assert_eq!(kind.to_string().parse::<EndpointKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_configurable_endpoint_resolver_defaults() {
        let resolver = ConfigurableEndpointResolver::new(&EndpointConfig::default());
        assert_eq!(resolver.resolve(EndpointKind::Gateway, Environment::Live), LIVE_URL);
        assert_eq!(
            resolver.resolve(EndpointKind::ThreeDSecureCallback, Environment::Test),
            TEST_3D_URL
        );
    }

    #[test]
    fn test_configurable_endpoint_resolver_partial() {
        let config = EndpointConfig {
            gateway: Some("https://sim.example.com/gateway".to_owned()),
            three_d_secure_callback: None,
        };
        let resolver = ConfigurableEndpointResolver::new(&config);

        assert_eq!(
            resolver.resolve(EndpointKind::Gateway, Environment::Simulator),
            "https://sim.example.com/gateway"
        );
        assert_eq!(
            resolver.resolve(EndpointKind::ThreeDSecureCallback, Environment::Simulator),
            SIMULATOR_3D_URL
        );
    }
}
