// Conformance suite for identity store backends.
//
// Each check takes the store by reference and panics with a descriptive
// message on contract violation, so backends can run the whole suite
// from a single #[tokio::test].

use gatehouse_core::db::store::{IdentityStore, StoreError, UniqueConstraint, UserFilter};
use gatehouse_core::{LocalCredentials, ProviderIdentity, ProviderKind, User};

/// A user with local credentials, for suite and backend tests.
pub fn sample_local_user(id: &str, email: &str) -> User {
    User::new_local(id.into(), LocalCredentials::new(email, "stored-hash"))
}

/// A user with a single provider identity, for suite and backend tests.
pub fn sample_provider_user(id: &str, provider: ProviderKind, external_id: &str) -> User {
    User::new_from_identity(
        id.into(),
        ProviderIdentity {
            provider,
            external_id: external_id.into(),
            access_token: "suite-token".into(),
            display_name: "Suite User".into(),
            username: None,
            email: None,
        },
    )
}

/// Run every conformance check against an empty store.
///
/// The store must start empty; the suite leaves records behind.
pub async fn run_store_suite<S: IdentityStore>(store: &S) {
    check_find_by_id_roundtrip(store).await;
    check_find_one_by_email(store).await;
    check_find_one_by_identity(store).await;
    check_save_upserts_by_id(store).await;
    check_email_uniqueness(store).await;
    check_identity_uniqueness(store).await;
    check_concurrent_duplicate_saves(store).await;
}

async fn check_find_by_id_roundtrip<S: IdentityStore>(store: &S) {
    let user = sample_local_user("suite-id-1", "roundtrip@suite.test");
    store.save(&user).await.expect("save must succeed on an empty store");

    let found = store
        .find_by_id("suite-id-1")
        .await
        .expect("find_by_id must not fail")
        .expect("saved user must be found by id");
    assert_eq!(found.id, user.id);
    assert_eq!(found.local_email(), Some("roundtrip@suite.test"));

    let missing = store.find_by_id("suite-never-saved").await.expect("lookup must not fail");
    assert!(missing.is_none(), "unknown id must resolve to None");
}

async fn check_find_one_by_email<S: IdentityStore>(store: &S) {
    let user = sample_local_user("suite-id-2", "casing@suite.test");
    store.save(&user).await.expect("save must succeed");

    // Emails are stored lowercased; the filter normalizes too.
    let found = store
        .find_one(&UserFilter::local_email("CASING@SUITE.TEST"))
        .await
        .expect("find_one must not fail")
        .expect("email lookup must be case-insensitive");
    assert_eq!(found.id, "suite-id-2");
}

async fn check_find_one_by_identity<S: IdentityStore>(store: &S) {
    let user = sample_provider_user("suite-id-3", ProviderKind::Facebook, "fb-suite-1");
    store.save(&user).await.expect("save must succeed");

    let found = store
        .find_one(&UserFilter::identity(ProviderKind::Facebook, "fb-suite-1"))
        .await
        .expect("find_one must not fail")
        .expect("identity lookup must find the saved user");
    assert_eq!(found.id, "suite-id-3");

    let wrong_provider = store
        .find_one(&UserFilter::identity(ProviderKind::Google, "fb-suite-1"))
        .await
        .expect("find_one must not fail");
    assert!(
        wrong_provider.is_none(),
        "external id must be scoped to its provider"
    );
}

async fn check_save_upserts_by_id<S: IdentityStore>(store: &S) {
    let mut user = sample_local_user("suite-id-4", "upsert@suite.test");
    store.save(&user).await.expect("initial save must succeed");

    user.attach_identity(ProviderIdentity {
        provider: ProviderKind::Twitter,
        external_id: "tw-suite-1".into(),
        access_token: "fresh".into(),
        display_name: "Updated".into(),
        username: Some("updated".into()),
        email: None,
    });
    store.save(&user).await.expect("re-save of the same id must succeed");

    let stored = store
        .find_by_id("suite-id-4")
        .await
        .expect("lookup must not fail")
        .expect("user must still exist");
    assert_eq!(stored.identities.len(), 1, "save must replace, not duplicate");
}

async fn check_email_uniqueness<S: IdentityStore>(store: &S) {
    store
        .save(&sample_local_user("suite-id-5", "unique@suite.test"))
        .await
        .expect("first save must succeed");

    let err = store
        .save(&sample_local_user("suite-id-6", "unique@suite.test"))
        .await
        .expect_err("second user with the same email must be rejected");
    assert!(
        matches!(err, StoreError::UniqueViolation(UniqueConstraint::LocalEmail)),
        "expected a local-email unique violation, got: {err}"
    );
}

async fn check_concurrent_duplicate_saves<S: IdentityStore>(store: &S) {
    let a = sample_local_user("suite-id-9", "race@suite.test");
    let b = sample_local_user("suite-id-10", "race@suite.test");

    // Overlapping saves of two records sharing an email: exactly one
    // may commit, the other must see the unique violation.
    let (first, second) = tokio::join!(store.save(&a), store.save(&b));
    let (saved, err) = match (first, second) {
        (Ok(saved), Err(err)) => (saved, err),
        (Err(err), Ok(saved)) => (saved, err),
        (Ok(_), Ok(_)) => panic!("both saves of a duplicated email succeeded"),
        (Err(e1), Err(e2)) => panic!("both saves of a duplicated email failed: {e1}, {e2}"),
    };
    assert_eq!(saved.local_email(), Some("race@suite.test"));
    assert!(
        matches!(err, StoreError::UniqueViolation(UniqueConstraint::LocalEmail)),
        "expected a local-email unique violation, got: {err}"
    );
}

async fn check_identity_uniqueness<S: IdentityStore>(store: &S) {
    store
        .save(&sample_provider_user("suite-id-7", ProviderKind::Google, "g-suite-1"))
        .await
        .expect("first save must succeed");

    let err = store
        .save(&sample_provider_user("suite-id-8", ProviderKind::Google, "g-suite-1"))
        .await
        .expect_err("second user with the same (provider, external id) must be rejected");
    assert!(
        matches!(err, StoreError::UniqueViolation(UniqueConstraint::ProviderIdentity)),
        "expected a provider-identity unique violation, got: {err}"
    );
}
