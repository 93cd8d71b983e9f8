//! In-memory [`IdentityStore`](gatehouse_core::IdentityStore) backend.
//!
//! Useful for tests and prototyping. Data is lost when the store is
//! dropped.

mod store;

pub use store::MemoryIdentityStore;
