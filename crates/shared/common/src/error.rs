//! Unified error handling for the data-access layer.
//!
//! Absence of a record is never an error; lookups return `Option`.
//! Storage failures are carried through unchanged.

use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Storage outcomes reported by the in-memory engine
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    // Engine errors, untouched
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(String),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Constraint(_) => "CONSTRAINT_VIOLATION",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Cancelled => "CANCELLED",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn not_found(record: impl Into<String>) -> Self {
        AppError::NotFound(record.into())
    }

    pub fn conflict(record: impl Into<String>) -> Self {
        AppError::Conflict(record.into())
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        AppError::Constraint(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
