// Strategy registry: an explicit value built once from options and
// passed by reference, not a process-wide singleton.

use std::collections::HashMap;
use std::sync::Arc;

use gatehouse_core::{AuthOptions, User};

use crate::context::AuthContext;
use crate::strategy::local::{LocalLoginStrategy, LocalSignupStrategy};
use crate::strategy::provider::ProviderLinkStrategy;
use crate::strategy::{AuthError, Credentials, Strategy};

/// Name-keyed map of authentication strategies. Read-only after
/// construction.
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry the options call for: local signup/login when
    /// local auth is enabled, one link strategy per configured provider.
    pub fn from_options(options: &AuthOptions) -> Self {
        let mut registry = Self::new();

        if options.local.enabled {
            registry.register(Arc::new(LocalSignupStrategy));
            registry.register(Arc::new(LocalLoginStrategy));
        }

        for provider in &options.providers {
            registry.register(Arc::new(ProviderLinkStrategy::new(provider.provider)));
        }

        registry
    }

    /// Register a strategy under its own name. Replaces any previous
    /// strategy with that name.
    pub fn register(&mut self, strategy: Arc<dyn Strategy>) {
        self.strategies.insert(strategy.name().to_string(), strategy);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Strategy>> {
        self.strategies.get(name)
    }

    /// Registered strategy names, sorted for stable output.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Dispatch credentials to the named strategy.
    pub async fn authenticate(
        &self,
        ctx: &AuthContext,
        name: &str,
        credentials: Credentials,
    ) -> Result<User, AuthError> {
        match self.get(name) {
            Some(strategy) => strategy.authenticate(ctx, credentials).await,
            None => Err(AuthError::UnknownStrategy(name.to_string())),
        }
    }
}
