use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::{ErrorCode, ErrorResponse, validation_details};
use mongodb::error::{ErrorKind, WriteFailure};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// Server error code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User with username {0} Not Found!")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationErrors),

    #[error("Duplicate value for {field}")]
    DuplicateKey { field: String },

    #[error("No Updates Sent!")]
    NoUpdatesProvided,

    /// Carries the rejected field names
    #[error("Incorrect Updates!")]
    InvalidUpdateFields(Vec<String>),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn duplicate(field: impl Into<String>) -> Self {
        UserError::DuplicateKey {
            field: field.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            UserError::NotFound(_) => StatusCode::NOT_FOUND,
            UserError::ValidationFailed(_)
            | UserError::DuplicateKey { .. }
            | UserError::NoUpdatesProvided
            | UserError::InvalidUpdateFields(_) => StatusCode::BAD_REQUEST,
            UserError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            UserError::StoreUnavailable(_) | UserError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            UserError::NotFound(_) => ErrorCode::NotFound,
            UserError::ValidationFailed(_) => ErrorCode::ValidationError,
            UserError::DuplicateKey { .. } => ErrorCode::DuplicateKey,
            UserError::NoUpdatesProvided => ErrorCode::NoUpdates,
            UserError::InvalidUpdateFields(_) => ErrorCode::InvalidUpdates,
            UserError::InvalidCredentials => ErrorCode::Unauthorized,
            UserError::StoreUnavailable(_) => ErrorCode::DatabaseError,
            UserError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Stable snake_case identifier, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            UserError::NotFound(_) => "not_found",
            UserError::ValidationFailed(_) => "validation_failed",
            UserError::DuplicateKey { .. } => "duplicate_key",
            UserError::NoUpdatesProvided => "no_updates_provided",
            UserError::InvalidUpdateFields(_) => "invalid_update_fields",
            UserError::InvalidCredentials => "invalid_credentials",
            UserError::StoreUnavailable(_) => "store_unavailable",
            UserError::Internal(_) => "internal",
        }
    }

    /// Message sent to clients. Server-side detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            UserError::ValidationFailed(_) => ErrorCode::ValidationError.default_message().into(),
            UserError::StoreUnavailable(_) => ErrorCode::DatabaseError.default_message().into(),
            UserError::Internal(_) => "An internal error occurred".into(),
            other => other.to_string(),
        }
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        let duplicate = match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE => {
                Some(e.message.as_str())
            }
            ErrorKind::Command(e) if e.code == DUPLICATE_KEY_CODE => Some(e.message.as_str()),
            _ => None,
        };

        match duplicate {
            Some(message) => UserError::duplicate(duplicate_field(message)),
            None => UserError::StoreUnavailable(err.to_string()),
        }
    }
}

/// Pull the offending field out of an E11000 message such as
/// `... index: email_1 dup key: { email: "a@b.co" }`.
pub(crate) fn duplicate_field(message: &str) -> String {
    message
        .split_once("dup key: {")
        .and_then(|(_, rest)| rest.split(':').next())
        .map(|field| field.trim().trim_matches('"').to_string())
        .filter(|field| !field.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error_code = code.code(), "{}", self);
        } else {
            tracing::info!(kind = self.kind(), error_code = code.code(), "{}", self);
        }

        let body = ErrorResponse::new(status, code, self.public_message());
        let body = match &self {
            UserError::ValidationFailed(errors) => body.with_details(validation_details(errors)),
            UserError::InvalidUpdateFields(fields) => {
                body.with_details(json!({ "invalidFields": fields }))
            }
            UserError::DuplicateKey { field } => body.with_details(json!({ "field": field })),
            _ => body,
        };

        body.into_response()
    }
}
