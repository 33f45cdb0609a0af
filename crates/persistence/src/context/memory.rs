//! In-memory storage engine.
//!
//! `MemoryDatabase` plays the role of the database server: committed rows
//! live there and survive across contexts. `MemoryContext` is the unit of
//! work over it. The engine enforces what a relational schema would:
//! unique primary keys, the order -> user foreign key (with cascading user
//! deletes) and "row must exist" for replace and delete.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;

use common::{AppError, AppResult, CancellationToken};
use domain::record::describe;
use domain::{Order, Record, User};

use super::tracker::ChangeTracker;
use super::{Change, DataContext, EntitySet, Tracked};

/// Kind of committed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Insert,
    Replace,
    Delete,
}

/// One row written by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// Record kind, e.g. `"user"`
    pub record: &'static str,
    pub id: i32,
    pub kind: MutationKind,
}

impl Mutation {
    fn of<E: Record>(id: i32, kind: MutationKind) -> Self {
        Self {
            record: E::KIND,
            id,
            kind,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    users: BTreeMap<i32, User>,
    orders: BTreeMap<i32, Order>,
}

#[derive(Default)]
struct Shared {
    tables: RwLock<Tables>,
    save_calls: AtomicUsize,
    log: Mutex<Vec<Mutation>>,
}

/// Shared in-memory store. Clones point at the same data.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    shared: Arc<Shared>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh unit of work
    pub fn context(&self) -> MemoryContext {
        MemoryContext::new(self.clone())
    }

    /// Number of `save_changes` calls made by any context, successful or not
    pub fn save_calls(&self) -> usize {
        self.shared.save_calls.load(Ordering::SeqCst)
    }

    /// Every committed mutation in commit order
    pub fn mutations(&self) -> Vec<Mutation> {
        self.shared
            .log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Committed users ordered by id
    pub fn committed_users(&self) -> Vec<User> {
        self.read(|t| t.users.values().cloned().collect())
    }

    /// Committed orders ordered by id
    pub fn committed_orders(&self) -> Vec<Order> {
        self.read(|t| t.orders.values().cloned().collect())
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let tables = self
            .shared
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&tables)
    }

    fn committed<E: Stored>(&self, id: i32) -> Option<E> {
        self.read(|t| E::table(t).get(&id).cloned())
    }

    /// Apply both change lists to a copy of the tables and publish it only
    /// if every change succeeds.
    fn commit(&self, users: &[Change<User>], orders: &[Change<Order>]) -> AppResult<u64> {
        let mut tables = self
            .shared
            .tables
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut working = tables.clone();
        let mut applied = Vec::new();

        // Parents first, children next, parent deletes last
        for change in users.iter().filter(|c| !c.is_removal()) {
            apply(&mut working, change, &mut applied)?;
        }
        for change in orders {
            apply(&mut working, change, &mut applied)?;
        }
        for change in users.iter().filter(|c| c.is_removal()) {
            apply(&mut working, change, &mut applied)?;
        }

        *tables = working;
        let rows = applied.len() as u64;
        self.shared
            .log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(applied);
        Ok(rows)
    }
}

/// Table access and storage rules per record kind.
pub(crate) trait Stored: Tracked {
    fn table(tables: &Tables) -> &BTreeMap<i32, Self>;

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<i32, Self>;

    /// Constraints checked before the row is written
    fn check(&self, _tables: &Tables) -> AppResult<()> {
        Ok(())
    }

    /// Dependent rows removed together with this one
    fn cascade(_id: i32, _tables: &mut Tables) {}
}

impl Stored for User {
    fn table(tables: &Tables) -> &BTreeMap<i32, Self> {
        &tables.users
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<i32, Self> {
        &mut tables.users
    }

    fn cascade(id: i32, tables: &mut Tables) {
        tables.orders.retain(|_, order| order.user_id != id);
    }
}

impl Stored for Order {
    fn table(tables: &Tables) -> &BTreeMap<i32, Self> {
        &tables.orders
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<i32, Self> {
        &mut tables.orders
    }

    fn check(&self, tables: &Tables) -> AppResult<()> {
        if tables.users.contains_key(&self.user_id) {
            Ok(())
        } else {
            Err(AppError::constraint(format!(
                "{} references missing {}",
                self.label(),
                describe::<User>(self.user_id)
            )))
        }
    }
}

fn apply<E: Stored>(
    tables: &mut Tables,
    change: &Change<E>,
    applied: &mut Vec<Mutation>,
) -> AppResult<()> {
    match change {
        Change::Added(entity) => {
            entity.check(tables)?;
            let table = E::table_mut(tables);
            if table.contains_key(&entity.id()) {
                return Err(AppError::conflict(entity.label()));
            }
            table.insert(entity.id(), entity.clone());
            applied.push(Mutation::of::<E>(entity.id(), MutationKind::Insert));
        }
        Change::Modified(entity) => {
            entity.check(tables)?;
            match E::table_mut(tables).get_mut(&entity.id()) {
                Some(row) => *row = entity.clone(),
                None => return Err(AppError::not_found(entity.label())),
            }
            applied.push(Mutation::of::<E>(entity.id(), MutationKind::Replace));
        }
        Change::Removed(entity) => {
            if E::table_mut(tables).remove(&entity.id()).is_none() {
                return Err(AppError::not_found(entity.label()));
            }
            E::cascade(entity.id(), tables);
            applied.push(Mutation::of::<E>(entity.id(), MutationKind::Delete));
        }
    }
    Ok(())
}

/// Entity set over the in-memory engine
pub(crate) struct MemorySet<E> {
    db: MemoryDatabase,
    tracker: ChangeTracker<E>,
}

impl<E: Stored> MemorySet<E> {
    fn new(db: MemoryDatabase) -> Self {
        Self {
            db,
            tracker: ChangeTracker::new(),
        }
    }
}

#[async_trait]
impl<E: Stored> EntitySet<E> for MemorySet<E> {
    async fn add(&self, entity: E) -> AppResult<()> {
        self.tracker.stage(Change::Added(entity));
        Ok(())
    }

    async fn find(&self, id: i32) -> AppResult<Option<E>> {
        match self.tracker.lookup(id) {
            Some(staged) => Ok(staged),
            None => Ok(self.db.committed(id)),
        }
    }

    fn update(&self, entity: E) {
        self.tracker.stage(Change::Modified(entity));
    }

    fn remove(&self, entity: E) {
        self.tracker.stage(Change::Removed(entity));
    }
}

/// Unit of work over a `MemoryDatabase`
pub struct MemoryContext {
    db: MemoryDatabase,
    users: Arc<MemorySet<User>>,
    orders: Arc<MemorySet<Order>>,
}

impl MemoryContext {
    pub fn new(db: MemoryDatabase) -> Self {
        Self {
            users: Arc::new(MemorySet::new(db.clone())),
            orders: Arc::new(MemorySet::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl DataContext for MemoryContext {
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
        self.db.shared.save_calls.fetch_add(1, Ordering::SeqCst);

        if cancel.is_cancelled() {
            tracing::warn!("Save cancelled before commit");
            return Err(AppError::Cancelled);
        }

        let users = self.users.tracker.pending();
        let orders = self.orders.tracker.pending();

        let rows = self.db.commit(&users, &orders)?;

        self.users.tracker.discard(users.len());
        self.orders.tracker.discard(orders.len());
        tracing::debug!(rows, "In-memory changes committed");
        Ok(rows)
    }
}
