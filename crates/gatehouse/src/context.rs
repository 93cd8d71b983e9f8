// Auth context — the fully-resolved configuration shared across request
// handlers as `Arc<AuthContext>`.

use std::sync::Arc;

use gatehouse_core::logger::AuthLogger;
use gatehouse_core::options::AuthOptions;
use gatehouse_core::IdentityStore;

/// Resolved password length bounds.
#[derive(Debug, Clone, Copy)]
pub struct PasswordConfig {
    pub min_password_length: usize,
    pub max_password_length: usize,
}

/// The shared auth context: options, the identity store, and the logger.
/// Created once at startup, read-only afterwards.
pub struct AuthContext {
    pub options: AuthOptions,
    pub store: Arc<dyn IdentityStore>,
    pub logger: AuthLogger,
    pub password_config: PasswordConfig,
}

// Manual Debug: provider client secrets must not leak into logs.
impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers: Vec<&str> = self
            .options
            .providers
            .iter()
            .map(|p| p.provider.as_str())
            .collect();
        f.debug_struct("AuthContext")
            .field("local_enabled", &self.options.local.enabled)
            .field("providers", &providers)
            .field("password_config", &self.password_config)
            .field("logger", &self.logger)
            .finish()
    }
}

impl AuthContext {
    /// Build a context from options and a store.
    pub fn new(options: AuthOptions, store: Arc<dyn IdentityStore>) -> Arc<Self> {
        let logger = AuthLogger::new(options.logger.clone());
        let password_config = PasswordConfig {
            min_password_length: options.local.min_password_length,
            max_password_length: options.local.max_password_length,
        };

        Arc::new(Self {
            options,
            store,
            logger,
            password_config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::{ProviderConfig, ProviderKind};
    use gatehouse_memory::MemoryIdentityStore;

    #[test]
    fn test_context_resolves_password_config() {
        let mut options = AuthOptions::new();
        options.local.min_password_length = 10;
        let ctx = AuthContext::new(options, Arc::new(MemoryIdentityStore::new()));
        assert_eq!(ctx.password_config.min_password_length, 10);
        assert_eq!(ctx.password_config.max_password_length, 128);
    }

    #[test]
    fn test_debug_does_not_leak_secrets() {
        let options = AuthOptions::new().with_provider(ProviderConfig::new(
            ProviderKind::Google,
            "client-id",
            "super-secret-value",
            "https://example.com/cb",
        ));
        let ctx = AuthContext::new(options, Arc::new(MemoryIdentityStore::new()));
        let debug = format!("{ctx:?}");
        assert!(debug.contains("google"));
        assert!(!debug.contains("super-secret-value"));
    }
}
