//! Error codes shared by every API error body.
//!
//! Each code has a SCREAMING_SNAKE_CASE identifier for clients, an integer
//! for logs and dashboards, and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request body or field values failed validation
    ValidationError,
    /// Request body could not be read as JSON
    InvalidJson,
    NotFound,
    Unauthorized,
    /// A unique field already holds the submitted value
    DuplicateKey,
    /// Update request carried no fields
    NoUpdates,
    /// Update request named fields that cannot be changed
    InvalidUpdates,
    PayloadTooLarge,
    MethodNotAllowed,

    // Server errors (1500-1999)
    InternalError,
    ServiceUnavailable,

    // Database errors (2000-2999)
    DatabaseError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidJson => "INVALID_JSON",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::NoUpdates => "NO_UPDATES",
            Self::InvalidUpdates => "INVALID_UPDATES",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }

    /// Integer code used in structured logs.
    ///
    /// - 1000-1499: client errors
    /// - 1500-1999: server errors
    /// - 2000-2999: database errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidJson => 1003,
            Self::NotFound => 1004,
            Self::Unauthorized => 1006,
            Self::DuplicateKey => 1008,
            Self::NoUpdates => 1012,
            Self::InvalidUpdates => 1013,
            Self::PayloadTooLarge => 1014,
            Self::MethodNotAllowed => 1015,
            Self::InternalError => 1500,
            Self::ServiceUnavailable => 1503,
            Self::DatabaseError => 2003,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Validation failed",
            Self::InvalidJson => "Failed to parse request body",
            Self::NotFound => "The requested resource was not found",
            Self::Unauthorized => "Invalid credentials",
            Self::DuplicateKey => "Duplicate value",
            Self::NoUpdates => "No Updates Sent!",
            Self::InvalidUpdates => "Incorrect Updates!",
            Self::PayloadTooLarge => "Request body is too large",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::InternalError => "Something went wrong!",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::DatabaseError => "Database is unavailable",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
