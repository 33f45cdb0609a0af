//! User database entity for SeaORM.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, DatabaseTransaction, QueryFilter, Set};

use domain::User;

use super::Mapped;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Not unique
    pub email: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
        }
    }
}

/// Convert domain entity to a fully set active model
impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        ActiveModel {
            id: Set(user.id),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            email: Set(user.email.clone()),
        }
    }
}

#[async_trait]
impl Mapped for User {
    async fn fetch(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr> {
        let model = Entity::find_by_id(id).one(db).await?;
        Ok(model.map(User::from))
    }

    async fn insert(&self, txn: &DatabaseTransaction) -> Result<u64, DbErr> {
        Entity::insert(ActiveModel::from(self))
            .exec_without_returning(txn)
            .await
    }

    async fn replace(&self, txn: &DatabaseTransaction) -> Result<u64, DbErr> {
        let mut active = ActiveModel::from(self);
        // Key goes in the filter, not the SET list
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
