//! SeaORM-backed unit of work.
//!
//! Staged changes are written inside one database transaction by
//! `save_changes`. Cancelling while the transaction is in flight drops
//! it, which rolls it back.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use common::{AppError, AppResult, CancellationToken};
use domain::{Order, User};

use super::tracker::ChangeTracker;
use super::{Change, DataContext, EntitySet};
use crate::entities::Mapped;

/// Entity set over a SeaORM connection
pub(crate) struct DbSet<E> {
    db: Arc<DatabaseConnection>,
    tracker: ChangeTracker<E>,
}

impl<E: Mapped> DbSet<E> {
    fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            tracker: ChangeTracker::new(),
        }
    }
}

#[async_trait]
impl<E: Mapped> EntitySet<E> for DbSet<E> {
    async fn add(&self, entity: E) -> AppResult<()> {
        self.tracker.stage(Change::Added(entity));
        Ok(())
    }

    async fn find(&self, id: i32) -> AppResult<Option<E>> {
        if let Some(staged) = self.tracker.lookup(id) {
            return Ok(staged);
        }
        let found = E::fetch(&self.db, id).await.map_err(AppError::from)?;
        Ok(found)
    }

    fn update(&self, entity: E) {
        self.tracker.stage(Change::Modified(entity));
    }

    fn remove(&self, entity: E) {
        self.tracker.stage(Change::Removed(entity));
    }
}

/// Unit of work over a SeaORM `DatabaseConnection`
pub struct DbContext {
    db: Arc<DatabaseConnection>,
    users: Arc<DbSet<User>>,
    orders: Arc<DbSet<Order>>,
}

impl DbContext {
    /// Create a new context; the connection pool is shared, the change sets are not
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            users: Arc::new(DbSet::new(db.clone())),
            orders: Arc::new(DbSet::new(db.clone())),
            db,
        }
    }

    /// Begin, apply, then commit; roll back on the first failure
    async fn commit(&self, users: &[Change<User>], orders: &[Change<Order>]) -> AppResult<u64> {
        let txn = self.db.begin().await.map_err(AppError::from)?;

        match apply_all(&txn, users, orders).await {
            Ok(rows) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(rows)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Parents first, children next, parent deletes last
async fn apply_all(
    txn: &DatabaseTransaction,
    users: &[Change<User>],
    orders: &[Change<Order>],
) -> AppResult<u64> {
    let mut rows = 0;
    for change in users.iter().filter(|c| !c.is_removal()) {
        rows += apply(txn, change).await?;
    }
    for change in orders {
        rows += apply(txn, change).await?;
    }
    for change in users.iter().filter(|c| c.is_removal()) {
        rows += apply(txn, change).await?;
    }
    Ok(rows)
}

async fn apply<E: Mapped>(txn: &DatabaseTransaction, change: &Change<E>) -> AppResult<u64> {
    let rows = match change {
        Change::Added(entity) => entity.insert(txn).await?,
        Change::Modified(entity) => entity.replace(txn).await?,
        Change::Removed(entity) => E::delete(txn, entity.id()).await?,
    };

    // A replace or delete that touched nothing means the row is gone
    if rows == 0 && !matches!(change, Change::Added(_)) {
        return Err(AppError::not_found(change.entity().label()));
    }
    Ok(rows)
}

#[async_trait]
impl DataContext for DbContext {
    fn users(&self) -> Arc<dyn EntitySet<User>> {
        self.users.clone()
    }

    fn orders(&self) -> Arc<dyn EntitySet<Order>> {
        self.orders.clone()
    }

    fn has_changes(&self) -> bool {
        !self.users.tracker.is_empty() || !self.orders.tracker.is_empty()
    }

    fn discard_changes(&self) {
        self.users.tracker.clear();
        self.orders.tracker.clear();
    }

    async fn save_changes(&self, cancel: &CancellationToken) -> AppResult<u64> {
        if cancel.is_cancelled() {
            tracing::warn!("Save cancelled before commit");
            return Err(AppError::Cancelled);
        }

        let users = self.users.tracker.pending();
        let orders = self.orders.tracker.pending();
        if users.is_empty() && orders.is_empty() {
            return Ok(0);
        }

        // Dropping the unfinished commit drops its transaction, which rolls back
        let commit = self.commit(&users, &orders);
        let Some(result) = cancel.run_until_cancelled(commit).await else {
            tracing::warn!("Save cancelled, transaction rolled back");
            return Err(AppError::Cancelled);
        };
        let rows = result?;

        self.users.tracker.discard(users.len());
        self.orders.tracker.discard(orders.len());
        tracing::debug!(rows, "Database changes committed");
        Ok(rows)
    }
}
