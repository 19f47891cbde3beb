use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use folio_core::UserId;

/// Session claim carried inside a signed session token.
///
/// The claim names the user only; role and permissions are resolved from
/// storage on every request so that changes apply without re-issuing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaim {
    #[serde(rename = "userId")]
    pub user_id: UserId,

    /// Issued-at (`iat`, unix seconds on the wire).
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    /// Expiration (`exp`, unix seconds on the wire).
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,

    /// Optional not-before (`nbf`); never set by [`Hs256SessionCodec::issue`](crate::Hs256SessionCodec::issue).
    #[serde(
        rename = "nbf",
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub not_before: Option<DateTime<Utc>>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at or nbf is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Tolerated clock skew between issuer and verifier for `iat`.
///
/// `nbf` and `exp` are enforced without leeway.
pub const ISSUED_AT_LEEWAY_SECS: i64 = 60;

/// Deterministically validate the claim time window against `now`.
///
/// Signature verification happens in the codec before this is called.
pub fn validate_claims(claims: &SessionClaim, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let issued_in_future = now + Duration::seconds(ISSUED_AT_LEEWAY_SECS) < claims.issued_at;
    if issued_in_future || claims.not_before.is_some_and(|nbf| now < nbf) {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
