// In-memory identity store — a HashMap of user records behind a
// tokio RwLock.
//
// `save` checks both uniqueness constraints (local email, provider
// identity) against every other record while holding the write lock, so
// concurrent duplicate saves resolve to exactly one winner.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use gatehouse_core::db::store::{
    IdentityStore, StoreError, StoreResult, UniqueConstraint, UserFilter,
};
use gatehouse_core::User;

type Records = HashMap<String, User>;

/// In-memory identity store.
///
/// Clones share the same underlying map, so a cloned handle can be
/// passed to an auth instance while the test keeps one for assertions.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityStore {
    records: Arc<RwLock<Records>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Remove all records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Snapshot of all users, for test assertions.
    pub async fn snapshot(&self) -> Vec<User> {
        self.records.read().await.values().cloned().collect()
    }
}

/// Find a record (other than `exclude_id`) that holds one of the unique
/// keys carried by `user`.
fn conflicting_constraint(records: &Records, user: &User, exclude_id: &str) -> Option<UniqueConstraint> {
    for existing in records.values() {
        if existing.id == exclude_id {
            continue;
        }
        if let (Some(a), Some(b)) = (user.local_email(), existing.local_email()) {
            if a == b {
                return Some(UniqueConstraint::LocalEmail);
            }
        }
        for identity in &user.identities {
            if existing.has_identity(identity.provider, &identity.external_id) {
                return Some(UniqueConstraint::ProviderIdentity);
            }
        }
    }
    None
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_one(&self, filter: &UserFilter) -> StoreResult<Option<User>> {
        let records = self.records.read().await;
        Ok(records.values().find(|u| filter.matches(u)).cloned())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn save(&self, user: &User) -> StoreResult<User> {
        let mut records = self.records.write().await;
        if let Some(constraint) = conflicting_constraint(&records, user, &user.id) {
            return Err(StoreError::UniqueViolation(constraint));
        }
        records.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }
}
