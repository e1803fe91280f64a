//! Authentication extractor for HTTP requests.
//!
//! Every protected route takes a [`UserContext`] argument. Axum resolves it
//! through the [`FromRequestParts`] impl below before the handler body runs,
//! so an unauthenticated call never reaches a store.

use std::fmt;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use tracing::warn;

use crate::auth::context::UserContext;
use crate::auth::token::TokenIssuer;

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No Authorization header, or not a Bearer credential
    Unauthenticated,
    /// Bad signature, malformed or expired token
    InvalidToken(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Authentication required"),
            Self::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Authentication extractor for HTTP requests.
#[derive(Clone)]
pub struct AuthExtractor {
    issuer: Arc<TokenIssuer>,
}

impl AuthExtractor {
    /// Create a new auth extractor.
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self { issuer }
    }

    /// Extract user context from the raw `Authorization` header value.
    pub fn extract_user(&self, authorization: Option<&str>) -> Result<UserContext, AuthError> {
        let token = authorization
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthenticated)?;

        let identity = self.issuer.verify(token)?;
        Ok(identity.into())
    }
}

impl<S> FromRequestParts<S> for UserContext
where
    AuthExtractor: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let extractor = AuthExtractor::from_ref(state);

        let authorization = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        extractor.extract_user(authorization).inspect_err(|e| {
            warn!(path = %parts.uri.path(), "Request rejected: {}", e);
        })
    }
}
