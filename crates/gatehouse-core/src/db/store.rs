// Identity store trait — the abstraction every user-record backend
// implements.
//
// The surface is intentionally small: the auth flows only ever look a
// user up by one of the two unique keys, look one up by id, or save.
// `save` is an upsert keyed on `user.id`; implementations must reject a
// save that would violate a uniqueness constraint held by another user.

use std::fmt;

use async_trait::async_trait;

use crate::db::models::{ProviderKind, User};

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The two lookup keys the auth flows query by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    /// Match on the local credential email (compared lowercased).
    LocalEmail(String),
    /// Match on a linked (provider, external id) pair.
    Identity {
        provider: ProviderKind,
        external_id: String,
    },
}

impl UserFilter {
    pub fn local_email(email: impl Into<String>) -> Self {
        Self::LocalEmail(email.into().to_lowercase())
    }

    pub fn identity(provider: ProviderKind, external_id: impl Into<String>) -> Self {
        Self::Identity {
            provider,
            external_id: external_id.into(),
        }
    }

    /// Whether a user matches this filter.
    pub fn matches(&self, user: &User) -> bool {
        match self {
            Self::LocalEmail(email) => user.local_email() == Some(email.as_str()),
            Self::Identity {
                provider,
                external_id,
            } => user.has_identity(*provider, external_id),
        }
    }
}

impl fmt::Display for UserFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalEmail(email) => write!(f, "local.email={email}"),
            Self::Identity {
                provider,
                external_id,
            } => write!(f, "{provider}.id={external_id}"),
        }
    }
}

/// The uniqueness constraints the store enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueConstraint {
    /// At most one user per local email.
    LocalEmail,
    /// At most one user per (provider, external id) pair.
    ProviderIdentity,
}

impl fmt::Display for UniqueConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalEmail => write!(f, "local email"),
            Self::ProviderIdentity => write!(f, "provider identity"),
        }
    }
}

/// Errors an identity store can produce.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached. Fatal for the current
    /// request; callers do not retry.
    #[error("identity store unreachable: {0}")]
    Unavailable(String),

    /// A save would give two users the same unique key.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(UniqueConstraint),

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Whether this error is a lost uniqueness race rather than a fault.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }
}

/// The identity store — persists user records keyed by id and looked up
/// by local email or (provider, external id).
#[async_trait]
pub trait IdentityStore: Send + Sync + fmt::Debug {
    /// Find a single user matching the filter. `Ok(None)` when no record
    /// matches.
    async fn find_one(&self, filter: &UserFilter) -> StoreResult<Option<User>>;

    /// Find a user by identifier.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    /// Insert or replace the record with `user.id`. Returns the stored
    /// record. Fails with [`StoreError::UniqueViolation`] when another
    /// user already holds one of this user's unique keys.
    async fn save(&self, user: &User) -> StoreResult<User>;
}
