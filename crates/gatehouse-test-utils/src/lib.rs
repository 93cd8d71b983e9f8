//! Test helpers shared across gatehouse crates.
//!
//! The store suite exercises the contract every [`IdentityStore`]
//! backend must honor: lookup by both unique keys, upsert-by-id save
//! semantics, and uniqueness enforcement.
//!
//! [`IdentityStore`]: gatehouse_core::IdentityStore

mod store_suite;

pub use store_suite::{run_store_suite, sample_local_user, sample_provider_user};
