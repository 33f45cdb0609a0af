//! Order database entity for SeaORM.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, DatabaseTransaction, QueryFilter, Set};

use domain::Order;

use super::Mapped;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub user_id: i32,
    pub product: String,
    pub quantity: i32,
    /// Exact NUMERIC(18, 2), never a float
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Order {
    fn from(model: Model) -> Self {
        Order {
            id: model.id,
            user_id: model.user_id,
            product: model.product,
            quantity: model.quantity,
            price: model.price,
        }
    }
}

/// Convert domain entity to a fully set active model
impl From<&Order> for ActiveModel {
    fn from(order: &Order) -> Self {
        ActiveModel {
            id: Set(order.id),
            user_id: Set(order.user_id),
            product: Set(order.product.clone()),
            quantity: Set(order.quantity),
            price: Set(order.price),
        }
    }
}

#[async_trait]
impl Mapped for Order {
    async fn fetch(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr> {
        let model = Entity::find_by_id(id).one(db).await?;
        Ok(model.map(Order::from))
    }

    async fn insert(&self, txn: &DatabaseTransaction) -> Result<u64, DbErr> {
        Entity::insert(ActiveModel::from(self))
            .exec_without_returning(txn)
            .await
    }

    async fn replace(&self, txn: &DatabaseTransaction) -> Result<u64, DbErr> {
        let mut active = ActiveModel::from(self);
        active.id = NotSet;

        let result = Entity::update_many()
            .set(active)
            .filter(Column::Id.eq(self.id))
            .exec(txn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete(txn: &DatabaseTransaction, id: i32) -> Result<u64, DbErr> {
        let result = Entity::delete_by_id(id).exec(txn).await?;
        Ok(result.rows_affected)
    }
}
