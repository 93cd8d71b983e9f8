//! Core types for gatehouse: user models, the identity-store trait,
//! errors, logging, and configuration.

pub mod db;
pub mod env;
pub mod error;
pub mod logger;
pub mod options;
pub mod utils;

// Re-exports for convenience
pub use db::models::{LocalCredentials, ProviderIdentity, ProviderKind, User};
pub use db::store::{IdentityStore, StoreError, StoreResult, UniqueConstraint, UserFilter};
pub use error::{ErrorCode, GatehouseError};
pub use logger::{AuthLogger, LogHandler, LogLevel, LoggerConfig};
pub use options::{AuthOptions, LocalAuthConfig, ProviderConfig};
