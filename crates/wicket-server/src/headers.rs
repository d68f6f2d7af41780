//! Security and cache headers.
//!
//! Every response carries the browser hardening headers. Dynamic responses
//! are marked uncacheable; static assets may be cached for four hours.

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, CACHE_CONTROL, EXPIRES, PRAGMA, REFERRER_POLICY,
    STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

/// Cache lifetime for static assets.
pub const STATIC_MAX_AGE_SECS: u32 = 14_400;

const X_XSS_PROTECTION: HeaderName = HeaderName::from_static("x-xss-protection");

const NO_STORE: &str = "no-store, no-cache, must-revalidate, max-age=0";
const STATIC_CACHE: &str = "public, max-age=14400, must-revalidate";
const HSTS: &str = "max-age=31536000; includeSubDomains";
const ALLOWED_HEADERS: &str = "Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, \
    Authorization, accept, origin, Cache-Control, X-Requested-With";

/// Header policy shared by the middleware functions.
#[derive(Debug, Clone, Copy)]
pub struct SecurityHeaders {
    hsts: bool,
}

impl SecurityHeaders {
    /// `hsts` should be true when the site is served over HTTPS.
    pub fn new(hsts: bool) -> Self {
        Self { hsts }
    }

    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        headers.insert(X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
        headers.insert(
            REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        if self.hsts {
            headers.insert(STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS));
        }
    }
}

/// Middleware for dynamic routes: hardening headers plus no caching.
pub async fn no_store(
    State(policy): State<SecurityHeaders>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    policy.apply(headers);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    response
}

/// Middleware for static assets: hardening headers plus a shared cache
/// lifetime of [`STATIC_MAX_AGE_SECS`].
pub async fn cacheable(
    State(policy): State<SecurityHeaders>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    policy.apply(headers);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(STATIC_CACHE));
    response
}
