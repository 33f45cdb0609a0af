//! Get and delete commands for single records.

use serde::Serialize;

use common::{AppError, AppResult};
use domain::record::describe;
use persistence::{OrderStore, Repository, Tracked, UserStore};

use super::Backend;
use crate::args::{Kind, RecordArgs};

/// Execute the get command
pub async fn execute_get(args: RecordArgs, backend: &Backend) -> AppResult<()> {
    let ctx = backend.context();

    let rendered = match args.kind {
        Kind::User => render(&UserStore::new(ctx), args.id).await?,
        Kind::Order => render(&OrderStore::new(ctx), args.id).await?,
    };
    println!("{}", rendered);
    Ok(())
}

/// Execute the delete command
pub async fn execute_delete(args: RecordArgs, backend: &Backend) -> AppResult<()> {
    let ctx = backend.context();

    match args.kind {
        Kind::User => UserStore::new(ctx).delete(args.id).await?,
        Kind::Order => OrderStore::new(ctx).delete(args.id).await?,
    }
    tracing::info!(kind = ?args.kind, id = args.id, "Delete finished");
    Ok(())
}

/// Record as pretty JSON, or a "not found" line
pub(crate) async fn render<E>(repo: &dyn Repository<E>, id: i32) -> AppResult<String>
where
    E: Tracked + Serialize,
{
    match repo.get_by_id(id).await? {
        Some(record) => to_json(&record),
        None => Ok(format!("{} not found", describe::<E>(id))),
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::internal(e.to_string()))
}
