//! Strategy-based session authentication.
//!
//! Gatehouse wires named credential strategies (local signup, local
//! login, and verified-provider identity linking) into a session
//! identity layer over a pluggable [`IdentityStore`]. The OAuth
//! handshake itself and the session transport are external
//! collaborators; this crate picks up where they hand off.
//!
//! ```no_run
//! use std::sync::Arc;
//! use gatehouse::{Credentials, Gatehouse};
//! use gatehouse_core::AuthOptions;
//! use gatehouse_memory::MemoryIdentityStore;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let auth = Gatehouse::new(AuthOptions::new(), Arc::new(MemoryIdentityStore::new()))?;
//! let user = auth
//!     .authenticate("local-signup", Credentials::local("a@example.com", "hunter2-hunter2"))
//!     .await?;
//! let token = auth.reduce(&user);
//! let restored = auth.restore(&token).await?;
//! assert_eq!(restored.id, user.id);
//! # Ok(())
//! # }
//! ```
//!
//! [`IdentityStore`]: gatehouse_core::IdentityStore

pub mod context;
pub mod crypto;
pub mod init;
pub mod registry;
pub mod session;
pub mod strategy;

pub use context::AuthContext;
pub use init::Gatehouse;
pub use registry::StrategyRegistry;
pub use session::{reduce, restore, RestoreError, SessionToken};
pub use strategy::provider::VerifiedProfile;
pub use strategy::{AuthError, Credentials, Strategy};

// Re-export the core types callers need at the API boundary.
pub use gatehouse_core::{
    AuthOptions, ErrorCode, GatehouseError, IdentityStore, LocalAuthConfig, ProviderConfig,
    ProviderKind, User,
};
