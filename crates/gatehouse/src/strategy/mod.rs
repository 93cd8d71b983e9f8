// Authentication strategies.
//
// A strategy pairs a name with a verification function; the registry
// dispatches credentials to it by name. The credential payload differs
// by family: local strategies take an email and password, provider
// strategies take a profile already verified by the provider's own
// handshake.

use std::fmt;

use async_trait::async_trait;

use gatehouse_core::db::store::StoreError;
use gatehouse_core::{ErrorCode, User};

use crate::context::AuthContext;

pub mod local;
pub mod provider;

pub use provider::VerifiedProfile;

/// The credential payload handed to a strategy.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Submitted email and plaintext password.
    Local { email: String, password: String },
    /// A profile verified by an external provider's handshake.
    Provider(VerifiedProfile),
}

impl Credentials {
    pub fn local(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Local {
            email: email.into(),
            password: password.into(),
        }
    }

    /// The credential family, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::Provider(_) => "provider",
        }
    }
}

/// Errors surfaced by `authenticate`.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A user-visible rejection (conflict, bad credentials, disabled
    /// flow). The code carries the message to show.
    #[error("{0}")]
    Rejected(ErrorCode),

    /// No strategy registered under the requested name.
    #[error("unknown authentication strategy: {0}")]
    UnknownStrategy(String),

    /// The credential payload does not match what the strategy accepts.
    #[error("strategy {strategy:?} cannot authenticate {kind} credentials")]
    UnsupportedCredentials {
        strategy: String,
        kind: &'static str,
    },

    /// Identity store fault; fatal for the current request.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl AuthError {
    /// The user-visible error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Rejected(code) => *code,
            Self::UnknownStrategy(_) => ErrorCode::UnknownStrategy,
            Self::UnsupportedCredentials { .. } => ErrorCode::InternalServerError,
            Self::Store(_) => ErrorCode::StoreUnavailable,
            Self::Internal(_) => ErrorCode::InternalServerError,
        }
    }
}

/// A named authentication method.
#[async_trait]
pub trait Strategy: Send + Sync + fmt::Debug {
    /// The registry key, e.g. `local-login` or `google`.
    fn name(&self) -> &str;

    /// Verify the credentials and return the authenticated user.
    async fn authenticate(
        &self,
        ctx: &AuthContext,
        credentials: Credentials,
    ) -> Result<User, AuthError>;
}
