//! Authenticated identity and extraction helpers.

use axum::extract::FromRequestParts;
use axum::response::Redirect;
use http::request::Parts;

/// Where unauthenticated browsers are sent.
pub const PUBLIC_ENTRY: &str = "/";

/// The identity behind a valid session cookie.
///
/// Inserted into the request extensions by [`AuthGate`](crate::AuthGate) for
/// the one request it validated. Taking it as a handler argument makes the
/// handler unreachable without a session: when it is absent, extraction
/// fails with a `303 See Other` to the public entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The user's email address.
    pub email: String,
}

/// Extract the `AuthenticatedUser` from HTTP request `Parts`, if present.
pub fn user_from_parts(parts: &Parts) -> Option<&AuthenticatedUser> {
    parts.extensions.get::<AuthenticatedUser>()
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts)
            .cloned()
            .ok_or_else(|| Redirect::to(PUBLIC_ENTRY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use http::StatusCode;

    fn parts_with_user() -> Parts {
        let (mut parts, _body) = http::Request::new(()).into_parts();
        parts.extensions.insert(AuthenticatedUser {
            email: "alice@example.com".to_string(),
        });
        parts
    }

    fn parts_without_user() -> Parts {
        let (parts, _body) = http::Request::new(()).into_parts();
        parts
    }

    #[test]
    fn test_user_from_parts_present() {
        let parts = parts_with_user();
        let user = user_from_parts(&parts).unwrap();
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn test_user_from_parts_absent() {
        let parts = parts_without_user();
        assert!(user_from_parts(&parts).is_none());
    }

    #[tokio::test]
    async fn test_extractor_present() {
        let mut parts = parts_with_user();
        let user = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_extractor_absent_redirects() {
        let mut parts = parts_without_user();
        let rejection = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();

        let resp = rejection.into_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[http::header::LOCATION], "/");
    }
}
