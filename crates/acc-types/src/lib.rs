//! Shared types and error types for the ACC exporter

pub mod errors;

pub use errors::{AppError, AppResult};
