//! Session token codec (HS256 JWT).
//!
//! Every failure (malformed, bad signature, expired, not yet valid) surfaces
//! as the same `InvalidSession` error so callers cannot tell them apart.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use folio_core::{AppError, UserId};

use crate::claims::{validate_claims, SessionClaim};

/// Default session lifetime (2 days).
pub const DEFAULT_SESSION_TTL_SECS: i64 = 2 * 24 * 60 * 60;

/// Verifies raw session tokens (scheme prefix already stripped).
pub trait SessionCodec: Send + Sync {
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaim, AppError>;
}

/// HS256 codec sharing one secret for issuing and verifying.
#[derive(Clone)]
pub struct Hs256SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl Hs256SessionCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        // Temporal claims are checked by `validate_claims` against the caller's
        // clock; the library only enforces signature, algorithm and `exp` presence.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a new session for `user_id`, valid from `now` for the configured TTL.
    pub fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = SessionClaim {
            user_id,
            issued_at: now,
            expires_at: now + self.ttl,
            not_before: None,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AppError::internal)
    }
}

impl SessionCodec for Hs256SessionCodec {
    fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaim, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::invalid_session());
        }

        let data = jsonwebtoken::decode::<SessionClaim>(token, &self.decoding, &self.validation)
            .map_err(|_| AppError::invalid_session())?;

        validate_claims(&data.claims, now).map_err(|_| AppError::invalid_session())?;

        Ok(data.claims)
    }
}

/// Decode `raw_token` with a one-off HS256 codec for `secret`.
pub fn decode(raw_token: &str, secret: &[u8], now: DateTime<Utc>) -> Result<SessionClaim, AppError> {
    Hs256SessionCodec::new(secret).decode(raw_token, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::ErrorKind;

    const SECRET: &[u8] = b"test-secret";

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn issued_tokens_decode_to_the_same_claim() {
        let codec = Hs256SessionCodec::new(SECRET);
        let token = codec.issue(UserId::new(7), now()).unwrap();

        let claim = codec.decode(&token, now()).unwrap();
        assert_eq!(claim.user_id, UserId::new(7));
        assert_eq!(claim.issued_at, now());
        assert_eq!(claim.expires_at, now() + Duration::seconds(DEFAULT_SESSION_TTL_SECS));
    }

    #[test]
    fn wrong_secret_is_an_invalid_session() {
        let token = Hs256SessionCodec::new(b"other-secret").issue(UserId::new(7), now()).unwrap();

        let err = decode(&token, SECRET, now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSession);
    }

    #[test]
    fn expired_token_is_an_invalid_session() {
        let codec = Hs256SessionCodec::new(SECRET).with_ttl(Duration::seconds(60));
        let token = codec.issue(UserId::new(7), now()).unwrap();

        let err = codec.decode(&token, now() + Duration::seconds(60)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSession);
    }

    #[test]
    fn malformed_and_empty_tokens_are_invalid_sessions() {
        let codec = Hs256SessionCodec::new(SECRET);
        for raw in ["", "   ", "not-a-jwt", "a.b.c"] {
            let err = codec.decode(raw, now()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidSession, "input {raw:?}");
        }
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = Hs256SessionCodec::new(SECRET);
        let token = codec.issue(UserId::new(7), now()).unwrap();
        let forged = Hs256SessionCodec::new(SECRET).issue(UserId::new(1), now()).unwrap();

        // Splice the payload of one token onto the signature of another.
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(codec.decode(&spliced, now()).unwrap_err().kind(), ErrorKind::InvalidSession);
    }
}
