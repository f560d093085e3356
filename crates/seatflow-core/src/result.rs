//! Convenience result type alias for Seatflow.

use crate::error::AppError;

/// A specialized `Result` type for Seatflow operations.
pub type AppResult<T> = Result<T, AppError>;
