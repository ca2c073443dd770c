//! Application error type and result alias.

mod app_error;

pub use app_error::{AppError, AppResult};
