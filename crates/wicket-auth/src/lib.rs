//! Authentication primitives for Wicket.
//!
//! Provides:
//! - [`SecretStore`] / [`SecretMaterial`]: the session-signing key, resolved once at startup
//! - [`SessionCodec`]: issue and validate signed session tokens
//! - [`RateLimiter`]: per-client sliding-window login throttle
//! - [`csrf::verify`]: double-submit CSRF check
//! - [`CookieFactory`]: session cookies with deployment-appropriate attributes
//! - [`DomainPolicy`]: company-domain admission rule
//! - [`AuthGateLayer`] / [`AuthGate`]: Tower middleware guarding protected routes
//! - [`IdentityVerifier`]: trait for verifying provider assertions (implement per provider)

#![forbid(unsafe_code)]

pub mod cookie;
pub mod csrf;
mod error;
mod middleware;
pub mod policy;
pub mod rate_limit;
pub mod secret;
pub mod session;
mod user;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub use cookie::{CookieFactory, SESSION_COOKIE};
pub use error::{PolicyError, SecretError, SessionError, VerificationError};
pub use middleware::{AuthGate, AuthGateLayer};
pub use policy::DomainPolicy;
pub use rate_limit::RateLimiter;
pub use secret::{SecretMaterial, SecretStore};
pub use session::{SessionClaims, SessionCodec};
pub use user::{user_from_parts, AuthenticatedUser, PUBLIC_ENTRY};

/// Upper bound on a single round trip to the identity provider.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// An identity the provider vouched for and that passed local policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Verified email address.
    pub email: String,
    /// Client the assertion was minted for.
    pub audience: String,
    /// Client the assertion was issued to.
    pub issued_to: String,
    /// Seconds of validity remaining on the assertion.
    pub expires_in: i64,
}

/// Trait for verifying identity assertions with an external provider.
///
/// Implement this for each identity provider. The login handler calls
/// `verify()` with the raw assertion and a deadline; implementations must
/// give up and return [`VerificationError::UpstreamUnreachable`] once the
/// deadline passes.
pub trait IdentityVerifier: Send + Sync + 'static {
    /// Verify an assertion and return the identity it proves.
    fn verify(
        &self,
        assertion: &str,
        deadline: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<VerifiedIdentity, VerificationError>> + Send + '_>>;
}
