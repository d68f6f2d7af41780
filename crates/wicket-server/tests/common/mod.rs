//! Shared fixtures for router tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response, header};
use tempfile::TempDir;

use wicket_auth::{
    CookieFactory, IdentityVerifier, SecretMaterial, SessionCodec, VerificationError,
    VerifiedIdentity,
};
use wicket_server::{AppState, ClientConfig, Site};

pub const CLIENT_ID: &str = "test-client.apps.googleusercontent.com";
pub const DASHBOARD_HTML: &str = "<html><body>dashboard</body></html>";
pub const CSRF: &str = "csrf-token-123";

/// What the stub identity provider answers.
pub enum Outcome {
    Accept(&'static str),
    Reject(fn() -> VerificationError),
}

/// Identity verifier that answers from a fixed outcome and counts calls.
pub struct StubVerifier {
    outcome: Outcome,
    calls: AtomicUsize,
    last_assertion: Mutex<Option<String>>,
    last_deadline: Mutex<Option<Duration>>,
}

impl StubVerifier {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_assertion: Mutex::new(None),
            last_deadline: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_assertion(&self) -> Option<String> {
        self.last_assertion.lock().unwrap().clone()
    }

    pub fn last_deadline(&self) -> Option<Duration> {
        *self.last_deadline.lock().unwrap()
    }
}

impl IdentityVerifier for StubVerifier {
    fn verify(
        &self,
        assertion: &str,
        deadline: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<VerifiedIdentity, VerificationError>> + Send + '_>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_assertion.lock().unwrap() = Some(assertion.to_string());
        *self.last_deadline.lock().unwrap() = Some(deadline);

        let result = match &self.outcome {
            Outcome::Accept(email) => Ok(VerifiedIdentity {
                email: email.to_string(),
                audience: CLIENT_ID.to_string(),
                issued_to: CLIENT_ID.to_string(),
                expires_in: 3600,
            }),
            Outcome::Reject(make) => Err(make()),
        };
        Box::pin(async move { result })
    }
}

pub struct TestApp {
    pub router: Router,
    pub verifier: Arc<StubVerifier>,
    pub codec: Arc<SessionCodec>,
    pub dir: TempDir,
}

/// A router over a temporary site directory.
pub fn test_app(outcome: Outcome, secure: bool) -> TestApp {
    test_app_with(outcome, secure, |state| state)
}

/// Like [`test_app`], with a chance to adjust the state before routing.
pub fn test_app_with(
    outcome: Outcome,
    secure: bool,
    configure: impl FnOnce(AppState) -> AppState,
) -> TestApp {
    let dir = TempDir::new().unwrap();
    let public = dir.path().join("public");
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(public.join("index.html"), "<html>login</html>").unwrap();
    std::fs::write(public.join("style.css"), "body {}").unwrap();
    std::fs::write(dir.path().join("monitor.txt"), "all systems nominal").unwrap();
    std::fs::write(dir.path().join("item_data.json"), r#"{"items":[1,2,3]}"#).unwrap();

    let codec = Arc::new(SessionCodec::new(Arc::new(SecretMaterial::from_bytes(
        [7; 32],
    ))));
    let verifier = Arc::new(StubVerifier::new(outcome));

    let site = Site {
        dashboard_page: DASHBOARD_HTML.to_string(),
        dashboard_data: dir.path().join("item_data.json"),
        monitor_file: dir.path().join("monitor.txt"),
        public_dir: public,
        client: ClientConfig {
            client_id: CLIENT_ID.to_string(),
            login_uri: "http://localhost:8080/api/login".to_string(),
        },
    };

    let state = AppState::new(
        codec.clone(),
        verifier.clone(),
        CookieFactory::new(secure),
        site,
    );

    TestApp {
        router: wicket_server::router(Arc::new(configure(state))),
        verifier,
        codec,
        dir,
    }
}

fn peer(ip: [u8; 4]) -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::from((ip, 40_000)))
}

/// `POST /api/login` from `ip` with an optional CSRF cookie and a form body.
pub fn login_request(ip: [u8; 4], csrf_cookie: Option<&str>, form: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .extension(peer(ip));
    if let Some(token) = csrf_cookie {
        builder = builder.header(header::COOKIE, format!("g_csrf_token={token}"));
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

/// A well-formed login with matching CSRF values.
pub fn valid_login(ip: [u8; 4]) -> Request<Body> {
    login_request(
        ip,
        Some(CSRF),
        &format!("credential=good-credential&g_csrf_token={CSRF}"),
    )
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn set_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .unwrap()
        .to_string()
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The `auth_token` value out of a `Set-Cookie` header.
pub fn session_token(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("auth_token="))
        .expect("auth_token cookie")
        .to_string()
}
