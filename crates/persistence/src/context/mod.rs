//! Unit of Work abstraction.
//!
//! A `DataContext` owns one typed `EntitySet` per record kind and a single
//! `save_changes` commit point. Set mutations are only staged; nothing
//! reaches storage until `save_changes` succeeds. A context belongs to one
//! unit of work and is not meant to be shared across requests.

mod memory;
mod sea;
mod tracker;

use std::sync::Arc;

use async_trait::async_trait;

use common::{AppResult, CancellationToken};
use domain::{Order, Record, User};

pub use memory::{MemoryContext, MemoryDatabase, Mutation, MutationKind};
pub use sea::DbContext;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Typed collection of one record kind inside a context.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EntitySet<E: Record>: Send + Sync {
    /// Stage an insert
    async fn add(&self, entity: E) -> AppResult<()>;

    /// Look up by primary key. Changes staged in this context win over storage.
    async fn find(&self, id: i32) -> AppResult<Option<E>>;

    /// Stage a whole-record replace
    fn update(&self, entity: E);

    /// Stage a delete
    fn remove(&self, entity: E);
}

/// Persistence context: entity sets plus the commit point.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DataContext: Send + Sync {
    /// User set
    fn users(&self) -> Arc<dyn EntitySet<User>>;

    /// Order set
    fn orders(&self) -> Arc<dyn EntitySet<Order>>;

    /// Whether any change is staged
    fn has_changes(&self) -> bool;

    /// Drop every staged change without touching storage
    fn discard_changes(&self);

    /// Commit every staged change atomically and return the affected row count.
    ///
    /// On error nothing is committed and the staged changes are kept.
    async fn save_changes(&self, cancel: &CancellationToken) -> AppResult<u64>;
}

/// Records that a `DataContext` exposes a set for.
pub trait Tracked: Record {
    fn set_in(ctx: &dyn DataContext) -> Arc<dyn EntitySet<Self>>;
}

impl Tracked for User {
    fn set_in(ctx: &dyn DataContext) -> Arc<dyn EntitySet<Self>> {
        ctx.users()
    }
}

impl Tracked for Order {
    fn set_in(ctx: &dyn DataContext) -> Arc<dyn EntitySet<Self>> {
        ctx.orders()
    }
}

/// A staged mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<E> {
    Added(E),
    Modified(E),
    Removed(E),
}

impl<E: Record> Change<E> {
    pub fn entity(&self) -> &E {
        match self {
            Change::Added(e) | Change::Modified(e) | Change::Removed(e) => e,
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, Change::Removed(_))
    }
}
