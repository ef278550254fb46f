//! Success and error responses shared by all REST handlers

mod error;
mod ok;

pub use error::{json_error_handler, ApiError, AuthenticationError};
pub use ok::ApiResponse;

/// Result alias used by the REST handlers
pub type DefaultApiResult<T> = Result<ApiResponse<T>, ApiError>;
