//! Error types for wicket-server

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use wicket_auth::{SessionError, VerificationError};

/// Why a login attempt was refused.
///
/// The response carries only a generic message; the detailed reason is
/// logged server-side.
#[derive(Error, Debug)]
pub enum LoginError {
    /// The client exhausted its login attempts for the current window.
    #[error("too many login attempts")]
    RateLimited,

    /// The CSRF cookie and form field were missing or differed.
    #[error("CSRF token mismatch")]
    CsrfMismatch,

    /// The identity provider or local policy rejected the assertion.
    #[error("verification failed: {0}")]
    Verification(#[from] VerificationError),

    /// A session token could not be signed.
    #[error("session creation failed: {0}")]
    SessionCreation(#[from] SessionError),
}

impl LoginError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::CsrfMismatch => StatusCode::FORBIDDEN,
            Self::Verification(VerificationError::InvalidDomain { .. }) => StatusCode::FORBIDDEN,
            Self::Verification(_) => StatusCode::UNAUTHORIZED,
            Self::SessionCreation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::RateLimited => "Too many login attempts. Please try again later.",
            Self::CsrfMismatch => "Invalid request.",
            Self::Verification(VerificationError::InvalidDomain { .. }) => "Access denied.",
            Self::Verification(VerificationError::Expired) => {
                "Authentication failed: Token expired"
            }
            Self::Verification(_) => "Authentication failed: Invalid credentials",
            Self::SessionCreation(_) => "Session creation failed",
        }
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        match &self {
            Self::SessionCreation(e) => tracing::error!(error = %e, "Session creation failed"),
            Self::Verification(e) if !e.is_client_error() => {
                tracing::warn!(reason = e.reason(), error = %e, "Identity provider unavailable")
            }
            _ => {}
        }

        (self.status(), self.public_message()).into_response()
    }
}
