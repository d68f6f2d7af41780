//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use wicket_auth::{CookieFactory, IdentityVerifier, RateLimiter, SessionCodec, VERIFY_TIMEOUT};

/// Settings the sign-in widget needs, served at `/api/config`.
#[derive(Debug, Clone, Serialize)]
pub struct ClientConfig {
    pub client_id: String,
    pub login_uri: String,
}

/// Site content behind the routes.
#[derive(Debug, Clone)]
pub struct Site {
    /// Dashboard page, read once at startup.
    pub dashboard_page: String,
    pub dashboard_data: PathBuf,
    pub monitor_file: PathBuf,
    pub public_dir: PathBuf,
    pub client: ClientConfig,
}

/// State shared by every handler.
pub struct AppState {
    pub codec: Arc<SessionCodec>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub limiter: Arc<RateLimiter>,
    pub cookies: CookieFactory,
    pub verify_timeout: Duration,
    pub site: Site,
}

impl AppState {
    /// State with the default login throttle and provider deadline.
    pub fn new(
        codec: Arc<SessionCodec>,
        verifier: Arc<dyn IdentityVerifier>,
        cookies: CookieFactory,
        site: Site,
    ) -> Self {
        Self {
            codec,
            verifier,
            limiter: Arc::new(RateLimiter::default()),
            cookies,
            verify_timeout: VERIFY_TIMEOUT,
            site,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_verify_timeout(mut self, timeout: Duration) -> Self {
        self.verify_timeout = timeout;
        self
    }
}
