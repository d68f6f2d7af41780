//! HTTP routes.
//!
//! Public: `POST /api/login`, `POST /api/logout`, `GET /monitor`,
//! `GET /api/config` and static files. Behind the session gate:
//! `GET /dashboard`, `GET /api/dashboard_data`, `GET /api/user`.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequest, FromRequestParts, Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::middleware;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;

use wicket_auth::csrf::{self, CSRF_FIELD};
use wicket_auth::{AuthGateLayer, AuthenticatedUser, PUBLIC_ENTRY};

use crate::error::LoginError;
use crate::headers::{self, SecurityHeaders};
use crate::state::AppState;

/// Where a successful login lands.
pub const DASHBOARD: &str = "/dashboard";

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let policy = SecurityHeaders::new(state.cookies.is_secure());

    let protected = Router::new()
        .route(DASHBOARD, get(dashboard))
        .route("/api/dashboard_data", get(dashboard_data))
        .route("/api/user", get(user_info))
        .route_layer(AuthGateLayer::new(state.codec.clone()));

    let static_files = ServiceBuilder::new()
        .layer(middleware::from_fn_with_state(policy, headers::cacheable))
        .service(ServeDir::new(&state.site.public_dir));

    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/config", get(client_config))
        .route("/monitor", get(monitor))
        .merge(protected)
        .route_layer(middleware::from_fn_with_state(policy, headers::no_store))
        .fallback_service(static_files)
        .with_state(state)
}

/// Rate-limit key for the caller: the peer IP without the ephemeral port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

impl<S> FromRequestParts<S> for ClientAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self(ip))
    }
}

/// Form posted by the sign-in widget.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    credential: String,
    #[serde(default)]
    g_csrf_token: String,
}

/// Exchange a provider assertion for a session cookie.
///
/// The throttle runs before the body is read, so a rejected client costs
/// neither a form parse nor a provider round trip.
async fn login(
    State(state): State<Arc<AppState>>,
    ClientAddr(client): ClientAddr,
    jar: CookieJar,
    request: Request,
) -> Result<impl IntoResponse, LoginError> {
    if !state.limiter.check_and_record(&client) {
        tracing::warn!(client = %client, "Login rate limit exceeded");
        return Err(LoginError::RateLimited);
    }

    let form = match Form::<LoginForm>::from_request(request, &state).await {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(client = %client, error = %rejection, "Unreadable login form");
            LoginForm::default()
        }
    };

    let cookie_token = jar.get(CSRF_FIELD).map(|cookie| cookie.value());
    if !csrf::verify(cookie_token, Some(form.g_csrf_token.as_str())) {
        tracing::warn!(
            client = %client,
            cookie_present = cookie_token.is_some(),
            field_present = !form.g_csrf_token.is_empty(),
            "CSRF check failed"
        );
        return Err(LoginError::CsrfMismatch);
    }

    let identity = state
        .verifier
        .verify(&form.credential, state.verify_timeout)
        .await
        .inspect_err(|e| {
            tracing::info!(client = %client, reason = e.reason(), error = %e, "Token verification failed")
        })?;

    let token = state.codec.issue(&identity.email)?;
    tracing::info!(email = %identity.email, "Login successful");

    Ok((jar.add(state.cookies.session(token)), Redirect::to(DASHBOARD)))
}

/// Expire the session cookie. Needs no valid session.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    tracing::info!("User logged out");
    (jar.add(state.cookies.clear_session()), Redirect::to(PUBLIC_ENTRY))
}

async fn user_info(user: AuthenticatedUser) -> String {
    format!("Authenticated user: {}", user.email)
}

async fn dashboard(_user: AuthenticatedUser, State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.site.dashboard_page.clone())
}

async fn dashboard_data(_user: AuthenticatedUser, State(state): State<Arc<AppState>>) -> Response {
    match tokio::fs::read(&state.site.dashboard_data).await {
        Ok(body) => ([(CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            tracing::error!(
                path = %state.site.dashboard_data.display(),
                error = %e,
                "Failed to read dashboard data"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Error reading dashboard data").into_response()
        }
    }
}

async fn monitor(State(state): State<Arc<AppState>>) -> Response {
    match tokio::fs::read(&state.site.monitor_file).await {
        Ok(body) => ([(CONTENT_TYPE, "text/plain")], body).into_response(),
        Err(e) => {
            tracing::error!(
                path = %state.site.monitor_file.display(),
                error = %e,
                "Failed to read monitor file"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Error reading monitor file").into_response()
        }
    }
}

async fn client_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.site.client.clone())
}
