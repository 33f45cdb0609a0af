//! Domain-level constants.

// =============================================================================
// Record kinds
// =============================================================================

/// Kind label for users (used in logs and error messages)
pub const KIND_USER: &str = "user";

/// Kind label for orders
pub const KIND_ORDER: &str = "order";

// =============================================================================
// Storage layout
// =============================================================================

/// Table holding user rows
pub const USERS_TABLE: &str = "users";

/// Table holding order rows
pub const ORDERS_TABLE: &str = "orders";
