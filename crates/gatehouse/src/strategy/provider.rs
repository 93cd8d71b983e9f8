// Provider identity linking.
//
// The provider's SDK has already run its OAuth handshake and handed back
// a verified profile; `link` turns that profile into a user record. The
// operation is an upsert keyed on (provider, external id): an existing
// user is returned as-is, otherwise a new one is created. A concurrent
// duplicate loses the race at the store's uniqueness constraint and the
// loser re-reads the winner, so repeated calls never create a second
// user.

use async_trait::async_trait;

use gatehouse_core::db::store::{StoreError, UniqueConstraint, UserFilter};
use gatehouse_core::utils::id::generate_id;
use gatehouse_core::{ProviderIdentity, ProviderKind, User};

use crate::context::AuthContext;
use crate::strategy::{AuthError, Credentials, Strategy};

/// A profile verified by an external provider's handshake.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedProfile {
    /// Provider-specific user identifier.
    pub external_id: String,
    /// The access token issued alongside the profile.
    pub access_token: String,
    pub display_name: String,
    /// Provider handle, where the provider has one (Twitter).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl VerifiedProfile {
    pub fn new(
        external_id: impl Into<String>,
        access_token: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            access_token: access_token.into(),
            display_name: display_name.into(),
            username: None,
            email: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Why a link failed. Rejections do not exist here: a valid verified
/// profile always resolves to a user unless the store faults.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error(transparent)]
    Store(StoreError),
    #[error("{0}")]
    Internal(String),
}

/// Find or create the user for a verified provider profile.
pub async fn link(
    ctx: &AuthContext,
    provider: ProviderKind,
    profile: VerifiedProfile,
) -> Result<User, LinkError> {
    let filter = UserFilter::identity(provider, profile.external_id.as_str());

    if let Some(user) = ctx.store.find_one(&filter).await.map_err(LinkError::Store)? {
        ctx.logger.debug(&format!(
            "{provider}: existing user {} for external id {}",
            user.id, profile.external_id
        ));
        return Ok(user);
    }

    let identity = ProviderIdentity {
        provider,
        external_id: profile.external_id.clone(),
        access_token: profile.access_token,
        display_name: profile.display_name,
        username: profile.username,
        email: profile.email,
    };
    let user = User::new_from_identity(generate_id(), identity);

    match ctx.store.save(&user).await {
        Ok(saved) => {
            ctx.logger
                .info(&format!("{provider}: created user {}", saved.id));
            Ok(saved)
        }
        Err(StoreError::UniqueViolation(UniqueConstraint::ProviderIdentity)) => {
            // Lost a concurrent link race; the winner's record is the
            // one to return.
            ctx.logger.warn(&format!(
                "{provider}: concurrent link for external id {}",
                profile.external_id
            ));
            match ctx.store.find_one(&filter).await.map_err(LinkError::Store)? {
                Some(user) => Ok(user),
                None => Err(LinkError::Internal(format!(
                    "identity {filter} missing after unique violation"
                ))),
            }
        }
        Err(e) => Err(LinkError::Store(e)),
    }
}

/// Strategy wrapper for one configured provider. Registered under the
/// provider's name (`facebook`, `twitter`, `google`).
#[derive(Debug)]
pub struct ProviderLinkStrategy {
    provider: ProviderKind,
}

impl ProviderLinkStrategy {
    pub fn new(provider: ProviderKind) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }
}

#[async_trait]
impl Strategy for ProviderLinkStrategy {
    fn name(&self) -> &str {
        self.provider.as_str()
    }

    async fn authenticate(
        &self,
        ctx: &AuthContext,
        credentials: Credentials,
    ) -> Result<User, AuthError> {
        match credentials {
            Credentials::Provider(profile) => {
                link(ctx, self.provider, profile).await.map_err(|e| match e {
                    LinkError::Store(err) => AuthError::Store(err),
                    LinkError::Internal(msg) => AuthError::Internal(msg),
                })
            }
            other => Err(AuthError::UnsupportedCredentials {
                strategy: self.name().to_string(),
                kind: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use gatehouse_core::db::store::StoreResult;
    use gatehouse_core::{AuthOptions, IdentityStore};
    use gatehouse_memory::MemoryIdentityStore;

    // Replays a lost link race deterministically: the first lookup sees
    // an empty store, the save fails on the identity constraint, and the
    // re-read finds the record the other caller committed.
    #[derive(Debug)]
    struct LostRaceStore {
        winner: User,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl IdentityStore for LostRaceStore {
        async fn find_one(&self, _filter: &UserFilter) -> StoreResult<Option<User>> {
            if self.lookups.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(None)
            } else {
                Ok(Some(self.winner.clone()))
            }
        }

        async fn find_by_id(&self, _id: &str) -> StoreResult<Option<User>> {
            Ok(None)
        }

        async fn save(&self, _user: &User) -> StoreResult<User> {
            Err(StoreError::UniqueViolation(UniqueConstraint::ProviderIdentity))
        }
    }

    fn ctx_with(store: MemoryIdentityStore) -> Arc<AuthContext> {
        let mut options = AuthOptions::new();
        options.logger.disabled = true;
        AuthContext::new(options, Arc::new(store))
    }

    #[tokio::test]
    async fn test_link_creates_user_with_identity() {
        let store = MemoryIdentityStore::new();
        let ctx = ctx_with(store.clone());

        let profile = VerifiedProfile::new("g-123", "at-1", "Ada Lovelace")
            .with_email("ada@example.com");
        let user = link(&ctx, ProviderKind::Google, profile).await.unwrap();

        let identity = user.identity(ProviderKind::Google).unwrap();
        assert_eq!(identity.external_id, "g-123");
        assert_eq!(identity.access_token, "at-1");
        assert_eq!(identity.display_name, "Ada Lovelace");
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_link_is_idempotent() {
        let store = MemoryIdentityStore::new();
        let ctx = ctx_with(store.clone());

        let first = link(
            &ctx,
            ProviderKind::Google,
            VerifiedProfile::new("123", "at-1", "A"),
        )
        .await
        .unwrap();
        let second = link(
            &ctx,
            ProviderKind::Google,
            VerifiedProfile::new("123", "at-2", "A"),
        )
        .await
        .unwrap();

        // Exactly one user with google.id = 123 after both calls.
        assert_eq!(first.id, second.id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_losing_a_link_race_returns_the_winner() {
        let winner = User::new_from_identity(
            "winner-id".into(),
            ProviderIdentity {
                provider: ProviderKind::Google,
                external_id: "g-raced".into(),
                access_token: "winner-token".into(),
                display_name: "Winner".into(),
                username: None,
                email: None,
            },
        );
        let store = LostRaceStore {
            winner: winner.clone(),
            lookups: AtomicUsize::new(0),
        };
        let mut options = AuthOptions::new();
        options.logger.disabled = true;
        let ctx = AuthContext::new(options, Arc::new(store));

        let user = link(
            &ctx,
            ProviderKind::Google,
            VerifiedProfile::new("g-raced", "loser-token", "Loser"),
        )
        .await
        .unwrap();

        assert_eq!(user.id, "winner-id");
        assert_eq!(
            user.identity(ProviderKind::Google).unwrap().access_token,
            "winner-token"
        );
    }

    #[tokio::test]
    async fn test_same_external_id_across_providers_is_distinct() {
        let store = MemoryIdentityStore::new();
        let ctx = ctx_with(store.clone());

        let a = link(
            &ctx,
            ProviderKind::Facebook,
            VerifiedProfile::new("123", "tok", "A"),
        )
        .await
        .unwrap();
        let b = link(
            &ctx,
            ProviderKind::Twitter,
            VerifiedProfile::new("123", "tok", "A").with_username("a_handle"),
        )
        .await
        .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.len().await, 2);
        assert_eq!(
            b.identity(ProviderKind::Twitter).unwrap().username.as_deref(),
            Some("a_handle")
        );
    }

    #[tokio::test]
    async fn test_strategy_wrapper_rejects_local_credentials() {
        let ctx = ctx_with(MemoryIdentityStore::new());
        let err = ProviderLinkStrategy::new(ProviderKind::Google)
            .authenticate(&ctx, Credentials::local("a@x.com", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedCredentials { .. }));
    }
}
