//! Init command - create missing tables.

use common::AppResult;

use super::Backend;

/// Execute the init command; the tables were ensured when the backend opened
pub async fn execute(backend: &Backend) -> AppResult<()> {
    match backend {
        Backend::Postgres(db) => {
            db.ping().await?;
            tracing::info!("Schema ready");
        }
        Backend::Memory(_) => tracing::info!("In-memory store needs no schema"),
    }
    Ok(())
}
