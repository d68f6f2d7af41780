//! Double-submit CSRF check.
//!
//! The identity provider's sign-in widget sets the same random token as the
//! `g_csrf_token` cookie and as a form field. A cross-origin page can make the
//! browser send the cookie but cannot read it to echo it in the body.

use subtle::ConstantTimeEq;

/// Name of both the CSRF cookie and the matching form field.
pub const CSRF_FIELD: &str = "g_csrf_token";

/// `true` iff both tokens are present, non-empty and byte-equal.
pub fn verify(cookie_token: Option<&str>, body_token: Option<&str>) -> bool {
    match (cookie_token, body_token) {
        (Some(cookie), Some(body)) if !cookie.is_empty() && !body.is_empty() => {
            cookie.as_bytes().ct_eq(body.as_bytes()).into()
        }
        _ => false,
    }
}
