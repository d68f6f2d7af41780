//! Auth-specific error types.

/// Errors produced while verifying an identity assertion with the provider.
///
/// Checks run in a fixed order and the first failure wins, so a response
/// that fails both the audience and the expiry check reports `InvalidAudience`.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// The provider could not be reached, timed out, failed with a 5xx or
    /// returned an unparseable body.
    #[error("identity provider unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The provider refused the assertion (4xx status), or the assertion
    /// was empty.
    #[error("identity assertion rejected: {0}")]
    InvalidAssertion(String),

    /// The assertion was minted for another client.
    #[error("invalid audience: got '{got}', expected '{expected}'")]
    InvalidAudience { got: String, expected: String },

    /// The `issued_to` field names another client.
    #[error("invalid issuer: got '{got}', expected '{expected}'")]
    InvalidIssuer { got: String, expected: String },

    /// No validity time remains on the assertion.
    #[error("token has expired")]
    Expired,

    /// The provider returned no email for the identity.
    #[error("no email in token")]
    MissingEmail,

    /// The email does not satisfy the company-domain policy.
    #[error("invalid domain for '{email}'")]
    InvalidDomain { email: String },
}

impl VerificationError {
    /// Stable snake_case reason, suitable for structured log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            VerificationError::UpstreamUnreachable(_) => "upstream_unreachable",
            VerificationError::InvalidAssertion(_) => "invalid_assertion",
            VerificationError::InvalidAudience { .. } => "invalid_audience",
            VerificationError::InvalidIssuer { .. } => "invalid_issuer",
            VerificationError::Expired => "expired",
            VerificationError::MissingEmail => "missing_email",
            VerificationError::InvalidDomain { .. } => "invalid_domain",
        }
    }

    /// Whether the failure is attributable to the presented assertion
    /// rather than to the provider.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, VerificationError::UpstreamUnreachable(_))
    }
}

/// Errors produced while issuing or validating a session token.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Not a structurally valid session token.
    #[error("malformed session token: {0}")]
    Malformed(String),

    /// The token was signed with a different secret.
    #[error("session token signature mismatch")]
    SignatureMismatch,

    /// `exp` is not after the validation instant.
    #[error("session token has expired")]
    Expired,

    /// The token could not be signed.
    #[error("failed to sign session token: {0}")]
    Signing(String),
}

impl SessionError {
    /// Stable snake_case reason, suitable for structured log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            SessionError::Malformed(_) => "malformed",
            SessionError::SignatureMismatch => "signature_mismatch",
            SessionError::Expired => "expired",
            SessionError::Signing(_) => "signing",
        }
    }
}

/// Fatal secret-resolution failure. Only the random generator can cause it;
/// every other problem falls through to the next source.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// The operating system RNG failed.
    #[error("failed to generate session secret: {0}")]
    Generate(#[source] rand::Error),
}

/// Company-domain policy string could not be parsed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PolicyError {
    /// No policy configured.
    #[error("company domain policy is empty")]
    Empty,

    /// The policy is a bare `@`.
    #[error("company domain policy '@' names no domain")]
    EmptyDomain,
}
