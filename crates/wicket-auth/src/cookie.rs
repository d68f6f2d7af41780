//! Session cookie construction.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::session::SESSION_TTL_SECS;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "auth_token";

/// Builds cookies with the attributes required for the current deployment.
///
/// Every cookie is `Path=/`, `HttpOnly` and `SameSite=Lax`; `Secure` is set
/// only when the site is served over HTTPS.
#[derive(Debug, Clone, Copy)]
pub struct CookieFactory {
    secure: bool,
}

impl CookieFactory {
    /// `secure` should be true in production / HTTPS deployments.
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Whether cookies are marked `Secure`.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Build a cookie. A negative `max_age_seconds` yields a removal cookie
    /// (`Max-Age=0`, empty value).
    pub fn build(
        &self,
        name: impl Into<String>,
        value: impl Into<String>,
        max_age_seconds: i64,
    ) -> Cookie<'static> {
        let (value, max_age) = if max_age_seconds < 0 {
            (String::new(), Duration::ZERO)
        } else {
            (value.into(), Duration::seconds(max_age_seconds))
        };

        Cookie::build((name.into(), value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .build()
    }

    /// The `auth_token` cookie carrying a freshly issued session token.
    pub fn session(&self, token: impl Into<String>) -> Cookie<'static> {
        self.build(SESSION_COOKIE, token, SESSION_TTL_SECS)
    }

    /// A cookie that overwrites and expires `auth_token`.
    pub fn clear_session(&self) -> Cookie<'static> {
        self.build(SESSION_COOKIE, "", -1)
    }
}
