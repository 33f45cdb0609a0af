//! Common utilities shared across the workspace crates.
//!
//! This crate provides:
//! - Unified error handling
//! - Configuration structures
//! - Cooperative cancellation
//! - Tracing initialisation

pub mod cancel;
pub mod config;
pub mod error;
pub mod telemetry;

pub use cancel::CancellationToken;
pub use config::*;
pub use error::{AppError, AppResult};
