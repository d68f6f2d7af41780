//! Session-cookie gate for protected routes.
//!
//! `AuthGateLayer` and `AuthGate` wrap any inner service. A request reaches
//! the inner service only if it carries an `auth_token` cookie that
//! validates; everything else is redirected to the public entry point.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::{IntoResponse, Redirect};
use axum_extra::extract::CookieJar;
use http::Request;
use tower::{Layer, Service};

use crate::cookie::SESSION_COOKIE;
use crate::session::SessionCodec;
use crate::user::{AuthenticatedUser, PUBLIC_ENTRY};

/// Tower `Layer` that puts routes behind a valid session.
#[derive(Clone)]
pub struct AuthGateLayer {
    codec: Arc<SessionCodec>,
}

impl AuthGateLayer {
    /// Create a gate validating with `codec`.
    pub fn new(codec: Arc<SessionCodec>) -> Self {
        Self { codec }
    }
}

impl<S> Layer<S> for AuthGateLayer {
    type Service = AuthGate<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthGate {
            inner,
            codec: self.codec.clone(),
        }
    }
}

/// Tower `Service` that validates the session cookie before forwarding.
///
/// On success, inserts [`AuthenticatedUser`] into the request extensions.
#[derive(Clone)]
pub struct AuthGate<S> {
    inner: S,
    codec: Arc<SessionCodec>,
}

impl<S> Service<Request<Body>> for AuthGate<S>
where
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let user = authenticate(&self.codec, &req);

        Box::pin(async move {
            let Some(user) = user else {
                return Ok(Redirect::to(PUBLIC_ENTRY).into_response());
            };

            req.extensions_mut().insert(user);
            let resp = inner
                .call(req)
                .await
                .unwrap_or_else(|infallible| match infallible {});
            Ok(resp.into_response())
        })
    }
}

/// Validate the session cookie on `req`. Failure reasons are logged and
/// never surfaced to the client.
fn authenticate(codec: &SessionCodec, req: &Request<Body>) -> Option<AuthenticatedUser> {
    let jar = CookieJar::from_headers(req.headers());
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        log::debug!("No session cookie on {}", req.uri().path());
        return None;
    };

    match codec.validate(cookie.value()) {
        Ok(claims) => Some(AuthenticatedUser {
            email: claims.email,
        }),
        Err(e) => {
            log::debug!(
                "Rejected session on {}: {}",
                req.uri().path(),
                e.reason()
            );
            None
        }
    }
}
