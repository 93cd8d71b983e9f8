// Environment detection and `GATEHOUSE_*` variable helpers.

use std::sync::OnceLock;

use crate::db::models::ProviderKind;
use crate::options::ProviderConfig;

/// Cached environment mode.
static ENV_MODE: OnceLock<EnvMode> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvMode {
    Production,
    Development,
    Test,
}

/// Detect the current environment mode. Checks `GATEHOUSE_ENV` then
/// `RUST_ENV`; the result is cached for the process lifetime.
pub fn detect_env_mode() -> EnvMode {
    *ENV_MODE.get_or_init(|| {
        let env_val = std::env::var("GATEHOUSE_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default()
            .to_lowercase();

        match env_val.as_str() {
            "production" | "prod" => EnvMode::Production,
            "test" | "testing" => EnvMode::Test,
            _ => EnvMode::Development,
        }
    })
}

pub fn is_production() -> bool {
    detect_env_mode() == EnvMode::Production
}

pub fn is_development() -> bool {
    detect_env_mode() == EnvMode::Development
}

/// Read one provider's credentials from the environment:
/// `GATEHOUSE_<PROVIDER>_CLIENT_ID`, `_CLIENT_SECRET`, `_CALLBACK_URL`.
/// Returns `None` unless all three are present.
pub fn provider_config_from_env(kind: ProviderKind) -> Option<ProviderConfig> {
    let prefix = format!("GATEHOUSE_{}", kind.as_str().to_uppercase());
    let client_id = std::env::var(format!("{prefix}_CLIENT_ID")).ok()?;
    let client_secret = std::env::var(format!("{prefix}_CLIENT_SECRET")).ok()?;
    let callback_url = std::env::var(format!("{prefix}_CALLBACK_URL")).ok()?;
    Some(ProviderConfig::new(kind, client_id, client_secret, callback_url))
}
