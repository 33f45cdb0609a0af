//! Repository layer for data access.

mod store;

pub use store::{OrderStore, Repository, Store, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use store::MockRepository;
