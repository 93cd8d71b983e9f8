// Instance construction: validate options, build the shared context and
// the strategy registry, and expose the public surface.

use std::sync::Arc;

use gatehouse_core::{AuthOptions, GatehouseError, IdentityStore, User};

use crate::context::AuthContext;
use crate::registry::StrategyRegistry;
use crate::session::{self, RestoreError, SessionToken};
use crate::strategy::{AuthError, Credentials};

/// A configured gatehouse instance.
///
/// Owns the read-only strategy registry and the shared [`AuthContext`].
/// Cheap to share behind an `Arc` in a host application.
pub struct Gatehouse {
    ctx: Arc<AuthContext>,
    registry: StrategyRegistry,
}

impl Gatehouse {
    /// Validate the options and build the instance.
    pub fn new(
        options: AuthOptions,
        store: Arc<dyn IdentityStore>,
    ) -> Result<Self, GatehouseError> {
        options.validate()?;

        let ctx = AuthContext::new(options, store);
        let registry = StrategyRegistry::from_options(&ctx.options);
        ctx.logger.info(&format!(
            "initialized with strategies: {}",
            registry.names().join(", ")
        ));

        Ok(Self { ctx, registry })
    }

    pub fn context(&self) -> &Arc<AuthContext> {
        &self.ctx
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Run the named strategy against the supplied credentials.
    pub async fn authenticate(
        &self,
        strategy: &str,
        credentials: Credentials,
    ) -> Result<User, AuthError> {
        self.registry.authenticate(&self.ctx, strategy, credentials).await
    }

    /// Reduce an authenticated user to its session token.
    pub fn reduce(&self, user: &User) -> SessionToken {
        session::reduce(user)
    }

    /// Restore the user for a session token from the identity store.
    pub async fn restore(&self, token: &SessionToken) -> Result<User, RestoreError> {
        session::restore(self.ctx.store.as_ref(), token).await
    }
}

impl std::fmt::Debug for Gatehouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gatehouse")
            .field("strategies", &self.registry.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::{ProviderConfig, ProviderKind};
    use gatehouse_memory::MemoryIdentityStore;

    #[test]
    fn test_new_validates_options() {
        let bad = AuthOptions::new().with_provider(ProviderConfig::new(
            ProviderKind::Google,
            "",
            "",
            "",
        ));
        let err = Gatehouse::new(bad, Arc::new(MemoryIdentityStore::new())).unwrap_err();
        assert!(matches!(err, GatehouseError::Config(_)));
    }

    #[test]
    fn test_debug_lists_strategies() {
        let mut options = AuthOptions::new();
        options.logger.disabled = true;
        let auth = Gatehouse::new(options, Arc::new(MemoryIdentityStore::new())).unwrap();
        let debug = format!("{auth:?}");
        assert!(debug.contains("local-signup"));
        assert!(debug.contains("local-login"));
    }
}
