//! Provider configuration
//!
//! Settings come from the provider block's attributes, falling back to
//! `OPC_*` environment variables.

use std::collections::HashMap;
use std::fmt;

use opc_core::resource::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required setting '{attribute}' (or environment variable {env})")]
    Missing {
        attribute: &'static str,
        env: &'static str,
    },

    #[error("Invalid value for '{attribute}': {message}")]
    Invalid {
        attribute: &'static str,
        message: String,
    },

    #[error(
        "Load Balancer Classic client is not initialized. Set the `lbaas_endpoint` setting to manage {0}"
    )]
    LbaasNotConfigured(String),
}

/// Connection settings for the OPC APIs
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub user: String,
    pub password: String,
    pub identity_domain: String,
    /// Compute API endpoint
    pub endpoint: String,
    /// Load Balancer Classic endpoint; load balancer resources need it
    pub lbaas_endpoint: Option<String>,
    /// Retries for failed API calls (default: 1)
    pub max_retries: u32,
    /// Skip TLS verification
    pub insecure: bool,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("identity_domain", &self.identity_domain)
            .field("endpoint", &self.endpoint)
            .field("lbaas_endpoint", &self.lbaas_endpoint)
            .field("max_retries", &self.max_retries)
            .field("insecure", &self.insecure)
            .finish()
    }
}

impl ProviderConfig {
    pub const DEFAULT_MAX_RETRIES: u32 = 1;

    /// Build from provider attributes, with `OPC_*` environment fallbacks
    pub fn from_attributes(attributes: &HashMap<String, Value>) -> Result<Self, ConfigError> {
        Self::resolve(attributes, |key| std::env::var(key).ok())
    }

    /// Build from provider attributes, looking fallbacks up with `env`
    pub fn resolve(
        attributes: &HashMap<String, Value>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |attribute: &'static str, var: &'static str| -> Option<String> {
            match attributes.get(attribute) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                _ => env(var).filter(|s| !s.is_empty()),
            }
        };
        let required = |attribute: &'static str, var: &'static str| {
            lookup(attribute, var).ok_or(ConfigError::Missing {
                attribute,
                env: var,
            })
        };

        let max_retries = match attributes.get("max_retries") {
            Some(Value::Int(n)) => u32::try_from(*n).map_err(|_| ConfigError::Invalid {
                attribute: "max_retries",
                message: format!("{} is not a non-negative integer", n),
            })?,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    attribute: "max_retries",
                    message: format!("expected Int, got {}", other.type_name()),
                });
            }
            None => match env("OPC_MAX_RETRIES") {
                Some(s) => s.parse().map_err(|_| ConfigError::Invalid {
                    attribute: "max_retries",
                    message: format!("'{}' is not a non-negative integer", s),
                })?,
                None => Self::DEFAULT_MAX_RETRIES,
            },
        };

        let insecure = match attributes.get("insecure") {
            Some(Value::Bool(b)) => *b,
            _ => env("OPC_INSECURE")
                .map(|s| matches!(s.as_str(), "1" | "true" | "TRUE" | "True"))
                .unwrap_or(false),
        };

        let endpoint = required("endpoint", "OPC_ENDPOINT")?;
        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            return Err(ConfigError::Invalid {
                attribute: "endpoint",
                message: format!("'{}' is not an http(s) URL", endpoint),
            });
        }

        Ok(Self {
            user: required("user", "OPC_USERNAME")?,
            password: required("password", "OPC_PASSWORD")?,
            identity_domain: required("identity_domain", "OPC_IDENTITY_DOMAIN")?,
            endpoint,
            lbaas_endpoint: lookup("lbaas_endpoint", "OPC_LBAAS_ENDPOINT"),
            max_retries,
            insecure,
        })
    }

    /// Fully qualified object name within this account
    pub fn qualified_name(&self, name: &str) -> String {
        opc_core::id::qualify_name(&self.identity_domain, &self.user, name)
    }
}
