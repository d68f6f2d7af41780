//! Server configuration.
//!
//! Every option can be given as a flag or through the environment. A `.env`
//! file in the working directory is merged into the environment before
//! parsing.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use wicket_auth_google::GOOGLE_TOKENINFO_URL;

/// Value of `ENV` that selects production mode.
pub const PRODUCTION: &str = "PRODUCTION";

/// Which set of provider settings the server runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Production,
    Development,
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => f.write_str("production"),
            Self::Development => f.write_str("development"),
        }
    }
}

/// Wicket - Google sign-in gate for the internal dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "wicket")]
#[command(about = "Google sign-in gate for the internal dashboard", long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "WICKET_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Deployment environment; `PRODUCTION` selects production settings
    #[arg(long = "env", env = "ENV")]
    pub environment: Option<String>,

    /// Set to `true` to mark cookies `Secure` outside production
    #[arg(long, env = "HTTPS")]
    pub https: Option<String>,

    /// Admission rule: `@example.com` admits the domain, anything else one address
    #[arg(long, env = "COMPANY_DOMAIN")]
    pub company_domain: String,

    /// Hex-encoded 32-byte session signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// File the session signing secret is loaded from or persisted to
    #[arg(long, env = "JWT_SECRET_FILE", default_value = ".jwt_secret")]
    pub jwt_secret_file: PathBuf,

    /// Google OAuth client ID used in production
    #[arg(long, env = "GOOGLE_CLIENT_ID_PRODUCTION")]
    pub google_client_id_production: Option<String>,

    /// Google OAuth client ID used in development
    #[arg(long, env = "GOOGLE_CLIENT_ID_DEVELOPMENT")]
    pub google_client_id_development: Option<String>,

    /// Login callback URI advertised to the sign-in widget in production
    #[arg(long, env = "LOGIN_URI_PRODUCTION")]
    pub login_uri_production: Option<String>,

    /// Login callback URI advertised to the sign-in widget in development
    #[arg(
        long,
        env = "LOGIN_URI_DEVELOPMENT",
        default_value = "http://localhost:8080/api/login"
    )]
    pub login_uri_development: String,

    /// Google token introspection endpoint
    #[arg(long, env = "GOOGLE_TOKENINFO_URL", default_value = GOOGLE_TOKENINFO_URL)]
    pub google_tokeninfo_url: String,

    /// Directory served for unmatched paths
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Dashboard page, loaded once at startup
    #[arg(long, env = "DASHBOARD_PAGE", default_value = "templates/dashboard.html")]
    pub dashboard_page: PathBuf,

    /// JSON document served to signed-in users
    #[arg(long, env = "DASHBOARD_DATA", default_value = "data/item_data.json")]
    pub dashboard_data: PathBuf,

    /// Plain-text status file served at /monitor
    #[arg(long, env = "MONITOR_FILE", default_value = "volume/monitor.txt")]
    pub monitor_file: PathBuf,

    /// Seconds between rate-limiter sweeps
    #[arg(long, env = "RATE_LIMIT_SWEEP_SECS", default_value_t = 300)]
    pub rate_limit_sweep_secs: u64,
}

impl Config {
    pub fn mode(&self) -> DeploymentMode {
        if self.environment.as_deref() == Some(PRODUCTION) {
            DeploymentMode::Production
        } else {
            DeploymentMode::Development
        }
    }

    /// Cookies are `Secure` (and HSTS is sent) in production or when
    /// `HTTPS=true`.
    pub fn secure_cookies(&self) -> bool {
        self.mode() == DeploymentMode::Production || self.https.as_deref() == Some("true")
    }

    /// The OAuth client ID for the current mode, if configured.
    pub fn client_id(&self) -> Option<&str> {
        let id = match self.mode() {
            DeploymentMode::Production => self.google_client_id_production.as_deref(),
            DeploymentMode::Development => self.google_client_id_development.as_deref(),
        };
        id.filter(|id| !id.is_empty())
    }

    /// The login URI for the current mode, if configured.
    pub fn login_uri(&self) -> Option<&str> {
        match self.mode() {
            DeploymentMode::Production => self.login_uri_production.as_deref(),
            DeploymentMode::Development => Some(self.login_uri_development.as_str()),
        }
        .filter(|uri| !uri.is_empty())
    }
}
