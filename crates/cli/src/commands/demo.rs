//! Demo command - walk a user and an order through their whole lifecycle.

use std::sync::Arc;

use common::{AppError, AppResult};
use domain::{Decimal, Order, User};
use persistence::{DataContext, OrderStore, Repository, UserStore};

use super::Backend;

/// Execute the demo command
pub async fn execute(backend: &Backend) -> AppResult<()> {
    let report = run(|| backend.context()).await?;

    for line in report {
        println!("{}", line);
    }
    Ok(())
}

/// Run every step, each on a fresh unit of work, and describe what happened.
pub(crate) async fn run<F>(new_context: F) -> AppResult<Vec<String>>
where
    F: Fn() -> Arc<dyn DataContext>,
{
    let users = || UserStore::new(new_context());
    let orders = || OrderStore::new(new_context());
    let mut report = Vec::new();

    let john = User::new(1, "John", "Doe", "john.doe@example.com");
    users().create(john.clone()).await?;
    report.push(format!("created {}", super::records::to_json(&john)?));

    let laptop = Order::new(1, john.id, "Laptop", 2, Decimal::new(99999, 2));
    orders().create(laptop.clone()).await?;
    let stored = expect_found(orders().get_by_id(laptop.id).await?, "order 1")?;
    report.push(format!(
        "order {} {} x{} at {} (total {})",
        stored.id,
        stored.product,
        stored.quantity,
        stored.price,
        stored.total()
    ));

    let jane = User::new(1, "Jane", "Doe", "jane.doe@example.com");
    users().update(jane).await?;
    let renamed = expect_found(users().get_by_id(1).await?, "user 1")?;
    report.push(format!("updated user 1 to {}", renamed.full_name()));

    orders().delete(laptop.id).await?;
    users().delete(john.id).await?;
    let gone = users().get_by_id(john.id).await?.is_none();
    report.push(format!("deleted user 1, lookup empty: {}", gone));

    // Nothing left to delete; this must not commit
    users().delete(john.id).await?;
    report.push("repeated delete was a no-op".to_string());

    Ok(report)
}

fn expect_found<T>(value: Option<T>, what: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::internal(format!("{} vanished during demo", what)))
}
