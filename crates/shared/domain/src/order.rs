//! Order domain entity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::KIND_ORDER;
use crate::record::Record;

/// Order placed by a user.
///
/// `user_id` must reference an existing user. That rule belongs to storage,
/// this type does not check it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub product: String,
    pub quantity: i32,
    /// Unit price
    pub price: Decimal,
}

impl Order {
    pub fn new(
        id: i32,
        user_id: i32,
        product: impl Into<String>,
        quantity: i32,
        price: Decimal,
    ) -> Self {
        Self {
            id,
            user_id,
            product: product.into(),
            quantity,
            price,
        }
    }

    /// Unit price times quantity
    pub fn total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl Record for Order {
    const KIND: &'static str = KIND_ORDER;

    fn id(&self) -> i32 {
        self.id
    }
}
