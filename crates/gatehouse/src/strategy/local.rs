// Local email/password strategies: signup and login.
//
// Login deliberately collapses "no such user" and "wrong password" into
// one InvalidCredentials outcome, and burns a hash on the missing-user
// path so timing does not reveal whether the email exists.

use async_trait::async_trait;

use gatehouse_core::db::store::{StoreError, UniqueConstraint, UserFilter};
use gatehouse_core::utils::id::generate_id;
use gatehouse_core::{ErrorCode, GatehouseError, LocalCredentials, User};

use crate::context::AuthContext;
use crate::crypto::password::{burn_hash, hash_password, verify_password};
use crate::strategy::{AuthError, Credentials, Strategy};

/// Why a signup was rejected.
#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("{}", ErrorCode::LocalAuthDisabled)]
    Disabled,
    #[error("{}", ErrorCode::SignupDisabled)]
    SignupDisabled,
    #[error("{}", ErrorCode::InvalidEmail)]
    InvalidEmail,
    #[error("{}", ErrorCode::PasswordTooShort)]
    PasswordTooShort,
    #[error("{}", ErrorCode::PasswordTooLong)]
    PasswordTooLong,
    /// A user with that email already exists. No record is created.
    #[error("{}", ErrorCode::UserAlreadyExists)]
    Conflict,
    #[error(transparent)]
    Store(StoreError),
    #[error("{0}")]
    Internal(String),
}

impl SignupError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Disabled => ErrorCode::LocalAuthDisabled,
            Self::SignupDisabled => ErrorCode::SignupDisabled,
            Self::InvalidEmail => ErrorCode::InvalidEmail,
            Self::PasswordTooShort => ErrorCode::PasswordTooShort,
            Self::PasswordTooLong => ErrorCode::PasswordTooLong,
            Self::Conflict => ErrorCode::UserAlreadyExists,
            Self::Store(_) => ErrorCode::StoreUnavailable,
            Self::Internal(_) => ErrorCode::InternalServerError,
        }
    }
}

/// Why a login was rejected.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("{}", ErrorCode::LocalAuthDisabled)]
    Disabled,
    /// One generic outcome for "no such user" and "wrong password".
    #[error("{}", ErrorCode::InvalidEmailOrPassword)]
    InvalidCredentials,
    #[error(transparent)]
    Store(StoreError),
    #[error("{0}")]
    Internal(String),
}

/// Minimal email shape check: one `@`, non-empty parts, dotted domain.
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    let (local, domain) = (parts[0], parts[1]);
    !local.is_empty() && !domain.is_empty() && domain.contains('.')
}

/// Register a new local-credential user.
///
/// 1. Check local auth is enabled and signup not disabled
/// 2. Validate email shape and password length bounds
/// 3. Reject if a user with that email exists
/// 4. Hash the password and persist the new user
///
/// A concurrent signup with the same email loses the race at the store's
/// uniqueness constraint and surfaces as `Conflict` too.
pub async fn signup(ctx: &AuthContext, email: &str, password: &str) -> Result<User, SignupError> {
    let local = &ctx.options.local;
    if !local.enabled {
        return Err(SignupError::Disabled);
    }
    if local.disable_signup {
        return Err(SignupError::SignupDisabled);
    }

    if !is_valid_email(email) {
        return Err(SignupError::InvalidEmail);
    }
    if password.len() < ctx.password_config.min_password_length {
        return Err(SignupError::PasswordTooShort);
    }
    if password.len() > ctx.password_config.max_password_length {
        return Err(SignupError::PasswordTooLong);
    }

    let email = email.to_lowercase();
    let existing = ctx
        .store
        .find_one(&UserFilter::local_email(email.as_str()))
        .await
        .map_err(SignupError::Store)?;
    if existing.is_some() {
        return Err(SignupError::Conflict);
    }

    // Hash before creating the record so a hashing failure leaves
    // nothing behind.
    let password_hash = match hash_password(password) {
        Ok(hash) => hash,
        Err(GatehouseError::Crypto(msg)) => return Err(SignupError::Internal(msg)),
        Err(e) => return Err(SignupError::Internal(e.to_string())),
    };

    let user = User::new_local(generate_id(), LocalCredentials::new(email.as_str(), password_hash));
    let saved = match ctx.store.save(&user).await {
        Ok(saved) => saved,
        Err(StoreError::UniqueViolation(UniqueConstraint::LocalEmail)) => {
            // Lost a concurrent signup race after the pre-check.
            ctx.logger
                .warn(&format!("local-signup: concurrent signup for {email}"));
            return Err(SignupError::Conflict);
        }
        Err(e) => return Err(SignupError::Store(e)),
    };

    ctx.logger
        .info(&format!("local-signup: created user {}", saved.id));
    Ok(saved)
}

/// Verify local credentials.
///
/// Succeeds iff the email exists and the stored hash matches.
pub async fn login(ctx: &AuthContext, email: &str, password: &str) -> Result<User, LoginError> {
    if !ctx.options.local.enabled {
        return Err(LoginError::Disabled);
    }

    let email = email.to_lowercase();
    let user = match ctx
        .store
        .find_one(&UserFilter::local_email(email.as_str()))
        .await
        .map_err(LoginError::Store)?
    {
        Some(user) => user,
        None => {
            burn_hash(password);
            return Err(LoginError::InvalidCredentials);
        }
    };

    let credentials = match &user.local {
        Some(credentials) => credentials,
        None => {
            burn_hash(password);
            return Err(LoginError::InvalidCredentials);
        }
    };

    let valid = verify_password(&credentials.password_hash, password)
        .map_err(|e| LoginError::Internal(format!("password verification failed: {e}")))?;
    if !valid {
        return Err(LoginError::InvalidCredentials);
    }

    ctx.logger
        .debug(&format!("local-login: authenticated user {}", user.id));
    Ok(user)
}

// Strategy wrappers.

#[derive(Debug, Default)]
pub struct LocalSignupStrategy;

#[async_trait]
impl Strategy for LocalSignupStrategy {
    fn name(&self) -> &str {
        "local-signup"
    }

    async fn authenticate(
        &self,
        ctx: &AuthContext,
        credentials: Credentials,
    ) -> Result<User, AuthError> {
        match credentials {
            Credentials::Local { email, password } => {
                signup(ctx, &email, &password).await.map_err(|e| match e {
                    SignupError::Store(err) => AuthError::Store(err),
                    SignupError::Internal(msg) => AuthError::Internal(msg),
                    rejected => AuthError::Rejected(rejected.code()),
                })
            }
            other => Err(AuthError::UnsupportedCredentials {
                strategy: self.name().to_string(),
                kind: other.kind(),
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct LocalLoginStrategy;

#[async_trait]
impl Strategy for LocalLoginStrategy {
    fn name(&self) -> &str {
        "local-login"
    }

    async fn authenticate(
        &self,
        ctx: &AuthContext,
        credentials: Credentials,
    ) -> Result<User, AuthError> {
        match credentials {
            Credentials::Local { email, password } => {
                login(ctx, &email, &password).await.map_err(|e| match e {
                    LoginError::Store(err) => AuthError::Store(err),
                    LoginError::Internal(msg) => AuthError::Internal(msg),
                    LoginError::Disabled => AuthError::Rejected(ErrorCode::LocalAuthDisabled),
                    LoginError::InvalidCredentials => {
                        AuthError::Rejected(ErrorCode::InvalidEmailOrPassword)
                    }
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

    use gatehouse_core::db::store::StoreResult;
    use gatehouse_core::AuthOptions;
    use gatehouse_core::IdentityStore;
    use gatehouse_memory::MemoryIdentityStore;

    // Looks empty on lookup but reports the email as taken on save, the
    // way a real backend behaves when another signup commits between the
    // pre-check and the insert.
    #[derive(Debug)]
    struct TakenEmailStore;

    #[async_trait]
    impl gatehouse_core::IdentityStore for TakenEmailStore {
        async fn find_one(&self, _filter: &UserFilter) -> StoreResult<Option<User>> {
            Ok(None)
        }

        async fn find_by_id(&self, _id: &str) -> StoreResult<Option<User>> {
            Ok(None)
        }

        async fn save(&self, _user: &User) -> StoreResult<User> {
            Err(StoreError::UniqueViolation(UniqueConstraint::LocalEmail))
        }
    }

    fn ctx_with(store: MemoryIdentityStore) -> Arc<AuthContext> {
        let mut options = AuthOptions::new();
        options.logger.disabled = true;
        AuthContext::new(options, Arc::new(store))
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user+tag@example.com"));
        assert!(!is_valid_email("invalid"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let store = MemoryIdentityStore::new();
        let ctx = ctx_with(store.clone());

        let user = signup(&ctx, "A@Example.com", "long-enough-pw").await.unwrap();
        assert_eq!(user.local_email(), Some("a@example.com"));
        assert_eq!(store.len().await, 1);

        let logged_in = login(&ctx, "a@example.com", "long-enough-pw").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_signup_keeps_original_record() {
        let store = MemoryIdentityStore::new();
        let ctx = ctx_with(store.clone());

        let first = signup(&ctx, "a@x.com", "password-one").await.unwrap();
        let err = signup(&ctx, "a@x.com", "password-two").await.unwrap_err();
        assert!(matches!(err, SignupError::Conflict));

        // The store still holds one record with the original hash.
        assert_eq!(store.len().await, 1);
        let stored = store.find_by_id(&first.id).await.unwrap().unwrap();
        let hash = &stored.local.as_ref().unwrap().password_hash;
        assert!(verify_password(hash, "password-one").unwrap());
        assert!(!verify_password(hash, "password-two").unwrap());
    }

    #[tokio::test]
    async fn test_signup_losing_a_concurrent_race_is_a_conflict() {
        let mut options = AuthOptions::new();
        options.logger.disabled = true;
        let ctx = AuthContext::new(options, Arc::new(TakenEmailStore));

        let err = signup(&ctx, "a@x.com", "long-enough-pw").await.unwrap_err();
        assert!(matches!(err, SignupError::Conflict));
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let ctx = ctx_with(MemoryIdentityStore::new());

        assert!(matches!(
            signup(&ctx, "not-an-email", "long-enough-pw").await.unwrap_err(),
            SignupError::InvalidEmail
        ));
        assert!(matches!(
            signup(&ctx, "a@x.com", "short").await.unwrap_err(),
            SignupError::PasswordTooShort
        ));
        let too_long = "x".repeat(200);
        assert!(matches!(
            signup(&ctx, "a@x.com", &too_long).await.unwrap_err(),
            SignupError::PasswordTooLong
        ));
    }

    #[tokio::test]
    async fn test_signup_respects_disable_flags() {
        let mut options = AuthOptions::new();
        options.logger.disabled = true;
        options.local.disable_signup = true;
        let ctx = AuthContext::new(options, Arc::new(MemoryIdentityStore::new()));
        assert!(matches!(
            signup(&ctx, "a@x.com", "long-enough-pw").await.unwrap_err(),
            SignupError::SignupDisabled
        ));

        let mut options = AuthOptions::new();
        options.logger.disabled = true;
        options.local.enabled = false;
        let ctx = AuthContext::new(options, Arc::new(MemoryIdentityStore::new()));
        assert!(matches!(
            signup(&ctx, "a@x.com", "long-enough-pw").await.unwrap_err(),
            SignupError::Disabled
        ));
        assert!(matches!(
            login(&ctx, "a@x.com", "long-enough-pw").await.unwrap_err(),
            LoginError::Disabled
        ));
    }

    #[tokio::test]
    async fn test_login_is_one_generic_rejection() {
        let ctx = ctx_with(MemoryIdentityStore::new());
        signup(&ctx, "a@x.com", "the-right-password").await.unwrap();

        // Unknown email and wrong password are indistinguishable.
        let unknown = login(&ctx, "b@x.com", "whatever-pw").await.unwrap_err();
        let wrong = login(&ctx, "a@x.com", "the-wrong-password").await.unwrap_err();
        assert!(matches!(unknown, LoginError::InvalidCredentials));
        assert!(matches!(wrong, LoginError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_strategy_wrappers_reject_provider_credentials() {
        let ctx = ctx_with(MemoryIdentityStore::new());
        let profile = crate::strategy::VerifiedProfile::new("ext", "tok", "Name");
        let err = LocalLoginStrategy
            .authenticate(&ctx, Credentials::Provider(profile))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedCredentials { .. }));
    }

    #[tokio::test]
    async fn test_signup_error_surfaces_as_rejected_code() {
        let ctx = ctx_with(MemoryIdentityStore::new());
        signup(&ctx, "a@x.com", "long-enough-pw").await.unwrap();

        let err = LocalSignupStrategy
            .authenticate(&ctx, Credentials::local("a@x.com", "long-enough-pw"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Rejected(ErrorCode::UserAlreadyExists)
        ));
    }
}
