//! Normalized API errors.
//!
//! Every failed remote call resolves to an [`ApiError`]; raw transport errors
//! only survive as its opaque `original` source.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message used when the server responds with an error but no message.
pub const GENERIC_SERVER_MESSAGE: &str = "Server error occurred";
/// Message used when no response was received.
pub const NETWORK_FAILURE_MESSAGE: &str = "Network error. Please check your connection.";
/// Message used when the request could not be sent at all.
pub const UNEXPECTED_FAILURE_MESSAGE: &str = "An unexpected error occurred";

/// Error categories shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    FileTooLarge,
    ValidationError,
    TooManyRequests,
    ServerError,
    NetworkError,
    ApiError,
    UnknownError,
}

impl ErrorCode {
    /// Maps an HTTP status (0 for "no response") to its category.
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => Self::NetworkError,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            413 => Self::FileTooLarge,
            422 => Self::ValidationError,
            429 => Self::TooManyRequests,
            500 => Self::ServerError,
            _ => Self::ApiError,
        }
    }

    /// Canonical message used when the server provides none.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "Invalid request. Please check your input.",
            Self::Unauthorized => "Authentication failed. Please login again.",
            Self::Forbidden => "Access denied. You don't have permission to perform this action.",
            Self::NotFound => "Resource not found.",
            Self::FileTooLarge => "File too large. Please choose a smaller image (max 1MB).",
            Self::ValidationError => "Invalid data provided. Please check your input.",
            Self::TooManyRequests => "Too many requests. Please try again later.",
            Self::ServerError => "Server error. Please try again later.",
            Self::NetworkError => "Network error. Please check your internet connection.",
            Self::ApiError | Self::UnknownError => UNEXPECTED_FAILURE_MESSAGE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::FileTooLarge => "FILE_TOO_LARGE",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::ServerError => "SERVER_ERROR",
            Self::NetworkError => "NETWORK_ERROR",
            Self::ApiError => "API_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized failure of a remote call.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// One-line summary suitable for display
    pub message: String,
    pub code: ErrorCode,
    /// HTTP status, or 0 when no response was received
    pub status: u16,
    /// Response body of a server-side failure, if it was JSON
    pub data: Option<Value>,
    /// Underlying transport or decoding error
    pub original: Option<Arc<dyn Error + Send + Sync>>,
}

impl ApiError {
    pub fn new(code: ErrorCode, status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            status,
            data: None,
            original: None,
        }
    }

    /// The server answered with a non-success status.
    ///
    /// Uses the body's `message` field when present.
    pub fn server(status: u16, data: Option<Value>) -> Self {
        let message = data
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|msg| !msg.is_empty())
            .unwrap_or(GENERIC_SERVER_MESSAGE)
            .to_string();
        Self {
            message,
            code: ErrorCode::ApiError,
            status,
            data,
            original: None,
        }
    }

    /// No response was received (connect failure, timeout).
    pub fn network(source: impl Error + Send + Sync + 'static) -> Self {
        Self::new(ErrorCode::NetworkError, 0, NETWORK_FAILURE_MESSAGE).with_original(source)
    }

    /// The request could not be built or sent.
    pub fn unknown(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            UNEXPECTED_FAILURE_MESSAGE.to_string()
        } else {
            message
        };
        Self::new(ErrorCode::UnknownError, 0, message)
    }

    /// A success response whose body did not have the expected shape.
    pub fn decode(status: u16, source: impl Error + Send + Sync + 'static) -> Self {
        Self::new(ErrorCode::ApiError, status, "Failed to decode response").with_original(source)
    }

    #[must_use]
    pub fn with_original(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.original = Some(Arc::new(source));
        self
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.original
            .as_deref()
            .map(|err| err as &(dyn Error + 'static))
    }
}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Maps a raw failure to its user-facing category and message.
///
/// The code comes from the status table; a status-0 failure that was never
/// sent keeps `UNKNOWN_ERROR`. A server-supplied message wins over the
/// category's default message.
pub fn classify(raw: &ApiError) -> ApiError {
    let code = match raw.status {
        0 if raw.code == ErrorCode::UnknownError => ErrorCode::UnknownError,
        status => ErrorCode::from_status(status),
    };

    let supplied = raw.message.trim();
    let message = if supplied.is_empty() || supplied == GENERIC_SERVER_MESSAGE {
        code.default_message().to_string()
    } else {
        supplied.to_string()
    };

    ApiError {
        message,
        code,
        status: raw.status,
        data: raw.data.clone(),
        original: raw.original.clone(),
    }
}
