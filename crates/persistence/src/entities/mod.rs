//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain records.
//! `Mapped` connects each domain record to its table.

pub mod order;
pub mod user;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr};

use crate::context::Tracked;

// Re-exports for public API convenience
pub use order::{ActiveModel as OrderActiveModel, Entity as OrderEntity, Model as OrderModel};
pub use user::{ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel};

/// Row-level statements for one record kind.
///
/// Writes run inside the commit transaction and report affected rows.
#[async_trait]
pub trait Mapped: Tracked {
    /// Select by primary key
    async fn fetch(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr>;

    /// Insert with the caller supplied id
    async fn insert(&self, txn: &DatabaseTransaction) -> Result<u64, DbErr>;

    /// Overwrite every column of the row with this id
    async fn replace(&self, txn: &DatabaseTransaction) -> Result<u64, DbErr>;

    /// Delete by primary key
    async fn delete(txn: &DatabaseTransaction, id: i32) -> Result<u64, DbErr>;
}
