//! HTTP error mapping.
//!
//! Component errors convert into [`ApiError`], which renders as
//! `{"error": "<message>"}` with the matching status code.

use std::fmt;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::auth::{AuthError, CredentialError};
use crate::contacts::ContactError;

/// Errors returned by HTTP handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Missing or malformed input (400)
    Validation(String),
    /// Missing, invalid or expired token, or a failed login (401)
    Unauthenticated(String),
    /// Username already registered (409)
    DuplicateUsername(String),
    /// Resource absent or owned by someone else (404)
    NotFound(String),
    /// Unexpected persistence failure (500). The detail is logged only.
    Store(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::DuplicateUsername(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client.
    fn public_message(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::Unauthenticated(msg)
            | Self::DuplicateUsername(msg)
            | Self::NotFound(msg) => msg,
            Self::Store(_) => "Internal server error",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Validation failed: {}", msg),
            Self::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            Self::DuplicateUsername(msg) => write!(f, "Conflict: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::Store(msg) => write!(f, "Store error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Store(detail) = &self {
            error!("Request failed: {}", detail);
        }

        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Unauthenticated(err.to_string())
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::MissingField(_) => Self::Validation(err.to_string()),
            CredentialError::DuplicateUsername(_) => Self::DuplicateUsername(err.to_string()),
            CredentialError::InvalidCredentials => Self::Unauthenticated(err.to_string()),
            CredentialError::Database(msg) => Self::Store(msg),
        }
    }
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::MissingField(_) => Self::Validation(err.to_string()),
            ContactError::NotFound(_) => Self::NotFound(err.to_string()),
            ContactError::Database(msg) => Self::Store(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Store(format!("{:#}", err))
    }
}
