//! Domain layer - Persisted records and their identity.
//!
//! This crate has no infrastructure dependencies. Storage engines and
//! repositories live in the `persistence` crate and map these types.

pub mod constants;
pub mod order;
pub mod record;
pub mod user;

pub use constants::*;
pub use order::Order;
pub use record::Record;
pub use user::User;

/// Exact decimal type used for currency amounts.
pub use rust_decimal::Decimal;
