//! # Error Handling
//!
//! Error types for the kmsplane crate, built with `thiserror`.
//!
//! Field-level validation violations are *not* errors: they are returned as a
//! [`crate::validation::ValidationResult`] and only block submission.

pub mod types;

pub use types::{KmsplaneError, Result};
