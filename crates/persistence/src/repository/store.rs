//! CRUD repository over any `DataContext`.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use common::{AppError, AppResult, CancellationToken};
use domain::{Order, User};

use crate::context::{DataContext, Tracked};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Repository trait for dependency injection.
///
/// Every write ends with exactly one `save_changes` on the context. When that
/// save fails, the context's pending changes are discarded before the error
/// is returned.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Repository<E: Tracked>: Send + Sync {
    /// Add the record and save. Duplicate ids are left to storage.
    async fn create(&self, entity: E) -> AppResult<()>;

    /// Find by primary key; absence is `Ok(None)`
    async fn get_by_id(&self, id: i32) -> AppResult<Option<E>>;

    /// Replace the whole record and save. Existence is left to storage.
    async fn update(&self, entity: E) -> AppResult<()>;

    /// Remove and save if the record exists, otherwise do nothing
    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Concrete repository for one record kind
pub struct Store<E> {
    ctx: Arc<dyn DataContext>,
    cancel: CancellationToken,
    _kind: PhantomData<fn() -> E>,
}

/// User repository
pub type UserStore = Store<User>;

/// Order repository
pub type OrderStore = Store<Order>;

impl<E: Tracked> Store<E> {
    /// Create new repository instance
    pub fn new(ctx: Arc<dyn DataContext>) -> Self {
        Self {
            ctx,
            cancel: CancellationToken::new(),
            _kind: PhantomData,
        }
    }

    /// Abort staging and commits once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn ensure_live(&self) -> AppResult<()> {
        if self.cancel.is_cancelled() {
            tracing::warn!(kind = E::KIND, "Operation cancelled before staging");
            return Err(AppError::Cancelled);
        }
        Ok(())
    }

    /// Commit; a failed commit drops the whole pending batch so it cannot
    /// ride along with a later save on the same context.
    async fn save(&self) -> AppResult<u64> {
        match self.ctx.save_changes(&self.cancel).await {
            Ok(rows) => Ok(rows),
            Err(e) => {
                self.ctx.discard_changes();
                tracing::warn!(
                    kind = E::KIND,
                    error = %e,
                    "Save failed, pending changes discarded"
                );
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<E: Tracked> Repository<E> for Store<E> {
    async fn create(&self, entity: E) -> AppResult<()> {
        self.ensure_live()?;
        let id = entity.id();

        E::set_in(self.ctx.as_ref()).add(entity).await?;
        let rows = self.save().await?;

        tracing::debug!(kind = E::KIND, id, rows, "Created");
        Ok(())
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<E>> {
        E::set_in(self.ctx.as_ref()).find(id).await
    }

    async fn update(&self, entity: E) -> AppResult<()> {
        self.ensure_live()?;
        let id = entity.id();

        E::set_in(self.ctx.as_ref()).update(entity);
        let rows = self.save().await?;

        tracing::debug!(kind = E::KIND, id, rows, "Updated");
        Ok(())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        self.ensure_live()?;
        let set = E::set_in(self.ctx.as_ref());

        let Some(entity) = set.find(id).await? else {
            tracing::debug!(kind = E::KIND, id, "Nothing to delete");
            return Ok(());
        };

        set.remove(entity);
        let rows = self.save().await?;

        tracing::debug!(kind = E::KIND, id, rows, "Deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{EntitySet, MockDataContext, MockEntitySet};
    use domain::Decimal;
    use mockall::predicate::eq;

    fn john() -> User {
        User::new(1, "John", "Doe", "john.doe@example.com")
    }

    fn laptop() -> Order {
        Order::new(1, 1, "Laptop", 2, Decimal::new(99999, 2))
    }

    /// Context whose user set is `users` and whose save is expected `saves` times
    fn user_context(users: MockEntitySet<User>, saves: usize) -> Arc<dyn DataContext> {
        let users: Arc<dyn EntitySet<User>> = Arc::new(users);
        let mut ctx = MockDataContext::new();
        ctx.expect_users().returning(move || users.clone());
        ctx.expect_save_changes().times(saves).returning(|_| Ok(1));
        Arc::new(ctx)
    }

    fn order_context(orders: MockEntitySet<Order>, saves: usize) -> Arc<dyn DataContext> {
        let orders: Arc<dyn EntitySet<Order>> = Arc::new(orders);
        let mut ctx = MockDataContext::new();
        ctx.expect_orders().returning(move || orders.clone());
        ctx.expect_save_changes().times(saves).returning(|_| Ok(1));
        Arc::new(ctx)
    }

    #[tokio::test]
    async fn test_create_user_adds_and_saves() {
        let mut users = MockEntitySet::<User>::new();
        users
            .expect_add()
            .with(eq(john()))
            .times(1)
            .returning(|_| Ok(()));

        let store = UserStore::new(user_context(users, 1));
        let result = store.create(john()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_get_user_existing_id() {
        let mut users = MockEntitySet::<User>::new();
        users
            .expect_find()
            .with(eq(1))
            .returning(|_| Ok(Some(john())));

        let store = UserStore::new(user_context(users, 0));
        let user = store.get_by_id(1).await.unwrap().unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.first_name, "John");
        assert_eq!(user.email, "john.doe@example.com");
    }

    #[tokio::test]
    async fn test_get_user_missing_id_is_none() {
        let mut users = MockEntitySet::<User>::new();
        users.expect_find().with(eq(999)).returning(|_| Ok(None));

        let store = UserStore::new(user_context(users, 0));
        let result = store.get_by_id(999).await;

        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_update_user_updates_and_saves() {
        let jane = User::new(1, "Jane", "Doe", "jane.doe@example.com");
        let mut users = MockEntitySet::<User>::new();
        users
            .expect_update()
            .with(eq(jane.clone()))
            .times(1)
            .return_const(());

        let store = UserStore::new(user_context(users, 1));

        assert!(store.update(jane).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_existing_id_removes_and_saves() {
        let mut users = MockEntitySet::<User>::new();
        users
            .expect_find()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(Some(john())));
        users
            .expect_remove()
            .with(eq(john()))
            .times(1)
            .return_const(());

        let store = UserStore::new(user_context(users, 1));

        assert!(store.delete(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_missing_id_never_saves() {
        let mut users = MockEntitySet::<User>::new();
        users
            .expect_find()
            .with(eq(999))
            .times(1)
            .returning(|_| Ok(None));
        users.expect_remove().never();

        let store = UserStore::new(user_context(users, 0));

        assert!(store.delete(999).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_order_adds_and_saves() {
        let mut orders = MockEntitySet::<Order>::new();
        orders
            .expect_add()
            .with(eq(laptop()))
            .times(1)
            .returning(|_| Ok(()));

        let store = OrderStore::new(order_context(orders, 1));

        assert!(store.create(laptop()).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_order_keeps_product_and_price() {
        let mut orders = MockEntitySet::<Order>::new();
        orders
            .expect_find()
            .with(eq(1))
            .returning(|_| Ok(Some(laptop())));

        let store = OrderStore::new(order_context(orders, 0));
        let order = store.get_by_id(1).await.unwrap().unwrap();

        assert_eq!(order.product, "Laptop");
        assert_eq!(order.price, Decimal::new(99999, 2));
    }

    #[tokio::test]
    async fn test_update_order_updates_and_saves() {
        let mut orders = MockEntitySet::<Order>::new();
        orders
            .expect_update()
            .with(eq(laptop()))
            .times(1)
            .return_const(());

        let store = OrderStore::new(order_context(orders, 1));

        assert!(store.update(laptop()).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_order_existing_id_removes_and_saves() {
        let mut orders = MockEntitySet::<Order>::new();
        orders
            .expect_find()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(Some(laptop())));
        orders
            .expect_remove()
            .with(eq(laptop()))
            .times(1)
            .return_const(());

        let store = OrderStore::new(order_context(orders, 1));

        assert!(store.delete(1).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_order_missing_id_never_saves() {
        let mut orders = MockEntitySet::<Order>::new();
        orders.expect_find().with(eq(999)).returning(|_| Ok(None));
        orders.expect_remove().never();

        let store = OrderStore::new(order_context(orders, 0));

        assert!(store.delete(999).await.is_ok());
    }

    #[tokio::test]
    async fn test_storage_error_propagates() {
        let mut users = MockEntitySet::<User>::new();
        users.expect_add().returning(|_| Ok(()));
        let users: Arc<dyn EntitySet<User>> = Arc::new(users);

        let mut ctx = MockDataContext::new();
        ctx.expect_users().returning(move || users.clone());
        ctx.expect_save_changes()
            .times(1)
            .returning(|_| Err(AppError::conflict("user 1")));
        ctx.expect_discard_changes().times(1).return_const(());

        let store = UserStore::new(Arc::new(ctx));
        let err = store.create(john()).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_successful_save_keeps_context_untouched() {
        let mut users = MockEntitySet::<User>::new();
        users.expect_add().returning(|_| Ok(()));
        let users: Arc<dyn EntitySet<User>> = Arc::new(users);

        let mut ctx = MockDataContext::new();
        ctx.expect_users().returning(move || users.clone());
        ctx.expect_save_changes().times(1).returning(|_| Ok(1));
        ctx.expect_discard_changes().never();

        let store = UserStore::new(Arc::new(ctx));

        assert!(store.create(john()).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_store_touches_nothing() {
        let mut users = MockEntitySet::<User>::new();
        users.expect_add().never();
        users.expect_find().never();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let store = UserStore::new(user_context(users, 0)).with_cancellation(cancel);

        assert!(matches!(store.create(john()).await, Err(AppError::Cancelled)));
        assert!(matches!(store.delete(1).await, Err(AppError::Cancelled)));
    }
}
