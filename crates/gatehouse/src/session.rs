// Session identity codec.
//
// At login the full user record is reduced to an opaque token (the
// user's id) for the host's session transport to carry. On each
// subsequent request the token is restored back into the full record
// via the identity store.

use serde::{Deserialize, Serialize};

use gatehouse_core::db::store::{IdentityStore, StoreError};
use gatehouse_core::User;

/// The opaque value stored in the request session. Created at login,
/// discarded by the host at logout or session expiry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reduce an authenticated user to its session token. No failure path.
pub fn reduce(user: &User) -> SessionToken {
    SessionToken(user.id.clone())
}

/// Why a token could not be restored.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RestoreError {
    /// The token references no stored user (deleted account, stale
    /// session).
    #[error("no user for session token")]
    NotFound,

    /// The identity store failed; fatal for the current request.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Restore the full user record for a session token.
pub async fn restore(
    store: &dyn IdentityStore,
    token: &SessionToken,
) -> Result<User, RestoreError> {
    match store.find_by_id(token.as_str()).await? {
        Some(user) => Ok(user),
        None => Err(RestoreError::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::LocalCredentials;
    use gatehouse_memory::MemoryIdentityStore;

    fn user(id: &str) -> User {
        User::new_local(id.into(), LocalCredentials::new("a@x.com", "hash"))
    }

    #[test]
    fn test_reduce_is_the_user_id() {
        let token = reduce(&user("u-42"));
        assert_eq!(token.as_str(), "u-42");
    }

    #[test]
    fn test_token_serializes_transparently() {
        let token = SessionToken::new("u-42");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"u-42\"");
        let back: SessionToken = serde_json::from_str("\"u-42\"").unwrap();
        assert_eq!(back, token);
    }

    #[tokio::test]
    async fn test_restore_round_trip() {
        let store = MemoryIdentityStore::new();
        let saved = store.save(&user("u-42")).await.unwrap();

        let token = reduce(&saved);
        let restored = restore(&store, &token).await.unwrap();
        assert_eq!(restored.id, saved.id);
        assert_eq!(restored.local_email(), saved.local_email());
    }

    #[tokio::test]
    async fn test_restore_unknown_token_is_not_found() {
        let store = MemoryIdentityStore::new();
        let err = restore(&store, &SessionToken::new("gone")).await.unwrap_err();
        assert!(matches!(err, RestoreError::NotFound));
    }
}
