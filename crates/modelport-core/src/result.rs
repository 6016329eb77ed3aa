//! Convenience result type alias for ModelPort.

use crate::error::AppError;

/// A specialized `Result` type for ModelPort operations.
pub type AppResult<T> = Result<T, AppError>;
