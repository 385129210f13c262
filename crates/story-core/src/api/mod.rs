//! Story API transport: client wrapper and normalized errors.

mod client;
mod error;

pub use client::{ApiClient, RequestBody, RequestOptions, USER_AGENT};
pub use error::{
    ApiError, ApiResult, ErrorCode, GENERIC_SERVER_MESSAGE, NETWORK_FAILURE_MESSAGE,
    UNEXPECTED_FAILURE_MESSAGE, classify,
};
