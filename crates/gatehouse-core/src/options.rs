// Configuration for a gatehouse instance.
//
// Strategy configuration is supplied up front and read-only at runtime:
// local auth knobs plus client credentials and callback endpoints for
// each remote provider.

use serde::{Deserialize, Serialize};

use crate::db::models::ProviderKind;
use crate::env;
use crate::error::GatehouseError;
use crate::logger::LoggerConfig;

/// Local email/password configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalAuthConfig {
    /// Whether local signup/login strategies are registered at all.
    pub enabled: bool,
    /// Disable signup while keeping login available.
    pub disable_signup: bool,
    pub min_password_length: usize,
    pub max_password_length: usize,
}

impl Default for LocalAuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            disable_signup: false,
            min_password_length: 8,
            max_password_length: 128,
        }
    }
}

/// Client credentials and callback endpoint for one remote provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
}

impl ProviderConfig {
    pub fn new(
        provider: ProviderKind,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            callback_url: callback_url.into(),
        }
    }
}

/// Top-level options. Constructed once and never mutated after the
/// instance is built.
#[derive(Debug, Clone, Default)]
pub struct AuthOptions {
    pub local: LocalAuthConfig,
    pub providers: Vec<ProviderConfig>,
    pub logger: LoggerConfig,
}

impl AuthOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a remote provider configuration (builder style).
    pub fn with_provider(mut self, config: ProviderConfig) -> Self {
        self.providers.push(config);
        self
    }

    /// Look up the configuration for a provider, if one was supplied.
    pub fn provider(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.provider == kind)
    }

    /// Load provider credentials from `GATEHOUSE_<PROVIDER>_*`
    /// environment variables. Providers without a complete set of
    /// variables are skipped.
    pub fn from_env() -> Self {
        let mut options = Self::new();
        for kind in ProviderKind::all() {
            if let Some(config) = env::provider_config_from_env(kind) {
                options.providers.push(config);
            }
        }
        options
    }

    /// Check the configuration for contradictions before building an
    /// instance.
    pub fn validate(&self) -> Result<(), GatehouseError> {
        if self.local.enabled && self.local.min_password_length > self.local.max_password_length {
            return Err(GatehouseError::Config(
                "minPasswordLength exceeds maxPasswordLength".into(),
            ));
        }

        for config in &self.providers {
            if config.client_id.is_empty() || config.client_secret.is_empty() {
                return Err(GatehouseError::Config(format!(
                    "provider {} is missing client credentials",
                    config.provider
                )));
            }
            if config.callback_url.is_empty() {
                return Err(GatehouseError::Config(format!(
                    "provider {} is missing a callback URL",
                    config.provider
                )));
            }
        }

        let mut seen: Vec<ProviderKind> = Vec::new();
        for config in &self.providers {
            if seen.contains(&config.provider) {
                return Err(GatehouseError::Config(format!(
                    "provider {} configured twice",
                    config.provider
                )));
            }
            seen.push(config.provider);
        }

        Ok(())
    }
}
