//! Application error model.
//!
//! Every failure that can reach a client is one of the variants below. The
//! HTTP boundary maps them with [`AppError::http_status`] and serializes
//! [`ErrorBody`]; nothing in the core writes to the network.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// Discriminant of an [`AppError`], for exhaustive matching without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InvalidCredentials,
    InvalidSession,
    InvalidAccess,
    Internal,
}

/// Application-level error.
///
/// Each variant carries the human-readable messages sent to the client; the
/// status and error code are fixed per variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// A record looked up after authorization does not exist.
    #[error("not found: {}", .0.join(" | "))]
    NotFound(Vec<String>),

    /// Path, query or body values could not be accepted.
    #[error("invalid arguments: {}", .0.join(" | "))]
    InvalidArgument(Vec<String>),

    /// Sign-in credentials were rejected.
    #[error("invalid credentials: {}", .0.join(" | "))]
    InvalidCredentials(Vec<String>),

    /// Missing, malformed, unverifiable or expired session, or the session
    /// refers to an identity that no longer resolves.
    #[error("invalid session: {}", .0.join(" | "))]
    InvalidSession(Vec<String>),

    /// Valid session, but the caller may not perform this request.
    #[error("invalid access: {}", .0.join(" | "))]
    InvalidAccess(Vec<String>),

    /// Infrastructure failure (storage, serialization of stored data).
    #[error("internal error: {}", .0.join(" | "))]
    Internal(Vec<String>),
}

fn owned<I, S>(messages: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    messages.into_iter().map(Into::into).collect()
}

impl AppError {
    pub fn not_found() -> Self {
        Self::NotFound(owned(["Not found"]))
    }

    pub fn invalid_argument<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::InvalidArgument(owned(messages))
    }

    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials(owned(["Invalid credentials"]))
    }

    pub fn invalid_session() -> Self {
        Self::InvalidSession(owned(["Invalid session"]))
    }

    pub fn invalid_access() -> Self {
        Self::InvalidAccess(owned(["Not enough permission."]))
    }

    /// Internal failure. The detail is logged, never sent to the client.
    pub fn internal(detail: impl core::fmt::Display) -> Self {
        tracing::error!(error = %detail, "internal error");
        Self::Internal(owned(["Uh, Houston, we've had a problem"]))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InvalidCredentials(_) => ErrorKind::InvalidCredentials,
            Self::InvalidSession(_) => ErrorKind::InvalidSession,
            Self::InvalidAccess(_) => ErrorKind::InvalidAccess,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidArgument => 422,
            ErrorKind::InvalidCredentials => 401,
            ErrorKind::InvalidSession => 401,
            ErrorKind::InvalidAccess => 403,
            ErrorKind::Internal => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "error.app.notFound",
            ErrorKind::InvalidArgument => "error.app.InvalidArgumentError",
            ErrorKind::InvalidCredentials => "error.app.InvalidCredentialsError",
            ErrorKind::InvalidSession => "error.app.InvalidSessionError",
            ErrorKind::InvalidAccess => "error.app.InvalidAccessError",
            ErrorKind::Internal => "error.app",
        }
    }

    pub fn messages(&self) -> &[String] {
        match self {
            Self::NotFound(m)
            | Self::InvalidArgument(m)
            | Self::InvalidCredentials(m)
            | Self::InvalidSession(m)
            | Self::InvalidAccess(m)
            | Self::Internal(m) => m,
        }
    }

    /// Wire body for this error.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            err_code: self.error_code().to_string(),
            err_messages: self.messages().to_vec(),
        }
    }
}

/// JSON shape of an error response: `{ "errCode": ..., "errMessages": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub err_code: String,
    pub err_messages: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_and_access_errors_have_distinct_statuses() {
        assert_eq!(AppError::invalid_session().http_status(), 401);
        assert_eq!(AppError::invalid_access().http_status(), 403);
        assert_eq!(AppError::not_found().http_status(), 404);
    }

    #[test]
    fn body_uses_camel_case_keys() {
        let body = serde_json::to_value(AppError::invalid_access().body()).unwrap();
        assert_eq!(body["errCode"], "error.app.InvalidAccessError");
        assert_eq!(body["errMessages"][0], "Not enough permission.");
    }

    #[test]
    fn display_joins_messages() {
        let err = AppError::invalid_argument(["Invalid ID", "Limit too small"]);
        assert_eq!(err.to_string(), "invalid arguments: Invalid ID | Limit too small");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
