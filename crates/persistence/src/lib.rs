//! Persistence Library
//!
//! Data access for users and orders following the Repository and
//! Unit of Work patterns.
//!
//! # Layers
//!
//! - **context**: the unit of work (`DataContext`) with its typed entity
//!   sets, backed either by SeaORM (`DbContext`) or an in-memory engine
//!   (`MemoryDatabase` / `MemoryContext`)
//! - **entities**: SeaORM table definitions and their mapping to domain records
//! - **repository**: CRUD repositories over any `DataContext`
//! - **infra**: connection management and schema bootstrap
//!
//! # Example
//!
//! ```ignore
//! let db = Database::connect(&DatabaseConfig::from_env()?).await?;
//! let users = UserStore::new(Arc::new(db.context()));
//! users.create(User::new(1, "John", "Doe", "john.doe@example.com")).await?;
//! ```

pub mod context;
pub mod entities;
pub mod infra;
pub mod repository;

pub use context::{
    Change, DataContext, DbContext, EntitySet, MemoryContext, MemoryDatabase, Mutation,
    MutationKind, Tracked,
};
pub use infra::Database;
pub use repository::{OrderStore, Repository, Store, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use context::{MockDataContext, MockEntitySet};
#[cfg(any(test, feature = "test-utils"))]
pub use repository::MockRepository;
