//! Errors surfaced to request handlers.
//!
//! Each variant carries the HTTP status and machine code the handler
//! responds with.

use kbase_rbac::AccessError;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Malformed or missing input.
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// No authenticated user.
    #[error("{0}")]
    Authentication(String),

    /// Authenticated, but not allowed.
    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    /// A required setting is missing, e.g. the storage bucket.
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Internal(String),
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn unauthenticated() -> Self {
        ApiError::Authentication("Unauthorized".to_string())
    }

    pub fn forbidden() -> Self {
        ApiError::Authorization("Forbidden".to_string())
    }

    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }

    /// HTTP status code for the response.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation { .. } => 400,
            ApiError::Authentication(_) => 401,
            ApiError::Authorization(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Configuration(_) | ApiError::Internal(_) => 500,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Authentication(_) => "AUTHENTICATION_ERROR",
            ApiError::Authorization(_) => "AUTHORIZATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Configuration(_) | ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// JSON body sent with the status code.
    ///
    /// Internal failures are reported generically; their detail is only
    /// logged.
    pub fn response_body(&self) -> Value {
        match self {
            ApiError::Internal(_) => json!({ "error": "Internal server error" }),
            other => json!({ "error": other.to_string() }),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::SelfDemotion => ApiError::invalid_field("role", err.to_string()),
            other => ApiError::Authorization(format!("Forbidden: {other}")),
        }
    }
}
