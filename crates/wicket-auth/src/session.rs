//! Locally signed session tokens.
//!
//! A session token is an HS256 JWT over [`SessionClaims`], keyed by the
//! process-wide [`SecretMaterial`]. Validation is stateless: a token is good
//! until `exp` unless the client throws its cookie away.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::secret::SecretMaterial;
use crate::SessionError;

/// Session lifetime in seconds (24 hours).
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims signed into every session token. Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Authenticated email address.
    pub email: String,
    /// Issued-at.
    pub iat: i64,
    /// Expires-at; always `iat + SESSION_TTL_SECS`.
    pub exp: i64,
}

/// Issues and validates session tokens.
#[derive(Clone)]
pub struct SessionCodec {
    secret: Arc<SecretMaterial>,
    validation: Validation,
}

impl SessionCodec {
    /// Codec keyed by `secret`.
    pub fn new(secret: Arc<SecretMaterial>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `validate_at`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self { secret, validation }
    }

    /// Issue a token for `email`, valid for 24 hours from now.
    pub fn issue(&self, email: &str) -> Result<String, SessionError> {
        self.issue_at(email, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<String, SessionError> {
        let iat = now.timestamp();
        let claims = SessionClaims {
            email: email.to_string(),
            iat,
            exp: iat + SESSION_TTL_SECS,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Validate `token` against the current time.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, SessionError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate `token` as if the current time were `now`.
    pub fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, SessionError> {
        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &self.validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => SessionError::SignatureMismatch,
            _ => SessionError::Malformed(e.to_string()),
        })?;

        let claims = data.claims;
        if claims.email.is_empty() || claims.exp <= claims.iat {
            return Err(SessionError::Malformed("inconsistent claims".to_string()));
        }
        if claims.exp <= now.timestamp() {
            return Err(SessionError::Expired);
        }

        Ok(claims)
    }
}
