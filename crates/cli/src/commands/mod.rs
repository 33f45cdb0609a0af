//! Commands module - CLI command implementations.

pub mod demo;
pub mod init;
pub mod records;

use std::sync::Arc;

use common::{AppResult, DatabaseConfig};
use persistence::{DataContext, Database, MemoryDatabase};

/// Storage the commands run against
pub(crate) enum Backend {
    Postgres(Database),
    Memory(MemoryDatabase),
}

impl Backend {
    /// Connect and make sure the tables exist
    pub(crate) async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let db = Database::connect(config).await?;
        db.ensure_schema().await?;
        Ok(Backend::Postgres(db))
    }

    /// Empty store that lives as long as the process
    pub(crate) fn in_memory() -> Self {
        Backend::Memory(MemoryDatabase::new())
    }

    /// Fresh unit of work
    pub(crate) fn context(&self) -> Arc<dyn DataContext> {
        match self {
            Backend::Postgres(db) => Arc::new(db.context()),
            Backend::Memory(db) => Arc::new(db.context()),
        }
    }
}
