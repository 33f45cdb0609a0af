//! SeaORM context tests against `MockDatabase`.
//!
//! Each committed save shows up as one transaction in the mock log;
//! plain lookups show up as one statement each.

use std::sync::Arc;

use sea_orm::{
    DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult, Transaction,
};

use common::{AppError, CancellationToken};
use domain::{Decimal, Order, User};
use persistence::entities::{OrderModel, UserModel};
use persistence::{
    DataContext, Database, DbContext, EntitySet, OrderStore, Repository, UserStore,
};

fn john() -> User {
    User::new(1, "John", "Doe", "john.doe@example.com")
}

fn john_row() -> UserModel {
    UserModel {
        id: 1,
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        email: "john.doe@example.com".to_string(),
    }
}

fn one_row() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    }
}

fn no_rows() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 0,
    }
}

fn connect(mock: MockDatabase) -> Arc<DatabaseConnection> {
    Arc::new(mock.into_connection())
}

/// Statements and transactions the mock saw; every context must be dropped first
fn transaction_log(conn: Arc<DatabaseConnection>) -> Vec<Transaction> {
    match Arc::try_unwrap(conn) {
        Ok(conn) => conn.into_transaction_log(),
        Err(_) => panic!("connection is still shared"),
    }
}

#[tokio::test]
async fn test_create_commits_one_transaction() {
    let conn = connect(
        MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([one_row()]),
    );
    let ctx = Arc::new(DbContext::new(conn.clone()));

    UserStore::new(ctx.clone()).create(john()).await.unwrap();

    assert!(!ctx.has_changes());
    drop(ctx);
    assert_eq!(transaction_log(conn).len(), 1);
}

#[tokio::test]
async fn test_get_by_id_maps_row() {
    let conn = connect(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![john_row()]]),
    );

    let user = UserStore::new(Arc::new(DbContext::new(conn)))
        .get_by_id(1)
        .await
        .unwrap();

    assert_eq!(user, Some(john()));
}

#[tokio::test]
async fn test_get_by_id_missing_is_none() {
    let conn = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<UserModel>::new()]),
    );

    let user = UserStore::new(Arc::new(DbContext::new(conn)))
        .get_by_id(999)
        .await
        .unwrap();

    assert_eq!(user, None);
}

#[tokio::test]
async fn test_order_price_is_exact() {
    let row = OrderModel {
        id: 1,
        user_id: 1,
        product: "Laptop".to_string(),
        quantity: 2,
        price: Decimal::new(99999, 2),
    };
    let conn = connect(
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![row]]),
    );

    let order = OrderStore::new(Arc::new(DbContext::new(conn)))
        .get_by_id(1)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(order, Order::new(1, 1, "Laptop", 2, Decimal::new(99999, 2)));
    assert_eq!(order.price.to_string(), "999.99");
}

#[tokio::test]
async fn test_delete_existing_selects_then_commits() {
    let conn = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![john_row()]])
            .append_exec_results([one_row()]),
    );

    UserStore::new(Arc::new(DbContext::new(conn.clone())))
        .delete(1)
        .await
        .unwrap();

    // select + one committed transaction
    assert_eq!(transaction_log(conn).len(), 2);
}

#[tokio::test]
async fn test_delete_missing_only_selects() {
    let conn = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<UserModel>::new()]),
    );

    UserStore::new(Arc::new(DbContext::new(conn.clone())))
        .delete(999)
        .await
        .unwrap();

    assert_eq!(transaction_log(conn).len(), 1);
}

#[tokio::test]
async fn test_update_missing_row_is_not_found() {
    let conn = connect(
        MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([no_rows()]),
    );
    let ctx = Arc::new(DbContext::new(conn));

    let err = UserStore::new(ctx.clone())
        .update(john())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    // The rejected replace is not left behind for the next save
    assert!(!ctx.has_changes());
}

#[tokio::test]
async fn test_storage_error_is_propagated_verbatim() {
    let conn = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors([DbErr::Custom("duplicate key".to_string())]),
    );

    let err = UserStore::new(Arc::new(DbContext::new(conn)))
        .create(john())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Database(_)));
    assert!(err.to_string().contains("duplicate key"));
}

#[tokio::test]
async fn test_next_save_after_failure_writes_only_new_changes() {
    let conn = connect(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors([DbErr::Custom("duplicate key".to_string())])
            .append_exec_results([one_row()]),
    );
    let ctx = Arc::new(DbContext::new(conn));

    assert!(UserStore::new(ctx.clone()).create(john()).await.is_err());

    // Only one exec result is left: a retried insert of user 1 would exhaust it
    let jane = User::new(2, "Jane", "Doe", "jane.doe@example.com");
    ctx.users().add(jane).await.unwrap();
    let rows = ctx.save_changes(&CancellationToken::new()).await.unwrap();

    assert_eq!(rows, 1);
    assert!(!ctx.has_changes());
}

#[tokio::test]
async fn test_discarded_changes_are_never_sent() {
    let conn = connect(MockDatabase::new(DatabaseBackend::Postgres));
    let ctx = DbContext::new(conn.clone());
    ctx.users().add(john()).await.unwrap();

    ctx.discard_changes();
    let rows = ctx.save_changes(&CancellationToken::new()).await.unwrap();

    assert_eq!(rows, 0);
    drop(ctx);
    assert!(transaction_log(conn).is_empty());
}

#[tokio::test]
async fn test_cancelled_save_sends_nothing() {
    let conn = connect(MockDatabase::new(DatabaseBackend::Postgres));
    let ctx = DbContext::new(conn.clone());
    ctx.users().add(john()).await.unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = ctx.save_changes(&cancel).await.unwrap_err();

    assert!(matches!(err, AppError::Cancelled));
    // Context-level saves leave the staged changes to the caller
    assert!(ctx.has_changes());
    drop(ctx);
    assert!(transaction_log(conn).is_empty());
}

#[tokio::test]
async fn test_ensure_schema_creates_both_tables() {
    let conn = connect(
        MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([no_rows(), no_rows()]),
    );
    let db = Database::from_connection(conn.clone());

    db.ensure_schema().await.unwrap();

    drop(db);
    assert_eq!(transaction_log(conn).len(), 2);
}
