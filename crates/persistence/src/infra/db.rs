//! Database connection and initialization.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr,
    EntityTrait, Schema, Statement,
};

use common::DatabaseConfig;

use crate::context::DbContext;
use crate::entities::{OrderEntity, UserEntity};

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: Arc<DatabaseConnection>,
}

impl Database {
    /// Open a connection pool sized by `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .sqlx_logging(config.sqlx_logging);

        let connection = SeaDatabase::connect(options).await?;
        tracing::info!("Database connected");

        Ok(Self::from_connection(Arc::new(connection)))
    }

    /// Wrap an existing connection (e.g. a mock in tests).
    pub fn from_connection(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Fresh unit of work sharing this connection pool
    pub fn context(&self) -> DbContext {
        DbContext::new(Arc::clone(&self.connection))
    }

    /// Create the `users` and `orders` tables from the entity definitions
    /// when they are missing. Existing tables are left untouched.
    pub async fn ensure_schema(&self) -> Result<(), DbErr> {
        // users must exist before the orders foreign key references it
        self.create_table(UserEntity).await?;
        self.create_table(OrderEntity).await?;
        tracing::info!("Schema ensured");
        Ok(())
    }

    async fn create_table<E: EntityTrait>(&self, entity: E) -> Result<(), DbErr> {
        let backend = self.connection.get_database_backend();
        let mut statement = Schema::new(backend).create_table_from_entity(entity);
        statement.if_not_exists();

        self.connection.execute(backend.build(&statement)).await?;
        Ok(())
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }
}
