//! Wicket server entry point.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;

use wicket_auth::{CookieFactory, DomainPolicy, RateLimiter, SecretStore, SessionCodec};
use wicket_auth_google::GoogleIdentityVerifier;
use wicket_server::{AppState, ClientConfig, Config, Site};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; values already in the environment win
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wicket=debug,tower_http=info".into()),
        )
        .init();

    let config = Config::parse();
    let mode = config.mode();
    tracing::info!(mode = %mode, secure_cookies = config.secure_cookies(), "Starting wicket");

    let policy: DomainPolicy = config
        .company_domain
        .parse()
        .context("invalid COMPANY_DOMAIN")?;
    tracing::info!(policy = %policy, "Company domain policy loaded");

    let secret = SecretStore::new(config.jwt_secret.clone(), config.jwt_secret_file.clone())
        .resolve()
        .context("failed to resolve session signing secret")?;
    let codec = Arc::new(SessionCodec::new(Arc::new(secret)));

    let dashboard_page = tokio::fs::read_to_string(&config.dashboard_page)
        .await
        .with_context(|| {
            format!(
                "failed to load dashboard page {}",
                config.dashboard_page.display()
            )
        })?;

    let client_id = config
        .client_id()
        .with_context(|| format!("no Google client ID configured for {mode} mode"))?
        .to_string();
    let login_uri = config
        .login_uri()
        .with_context(|| format!("no login URI configured for {mode} mode"))?
        .to_string();

    let verifier = GoogleIdentityVerifier::new(client_id.clone(), policy)
        .with_tokeninfo_url(config.google_tokeninfo_url.clone());

    let site = Site {
        dashboard_page,
        dashboard_data: config.dashboard_data.clone(),
        monitor_file: config.monitor_file.clone(),
        public_dir: config.public_dir.clone(),
        client: ClientConfig {
            client_id,
            login_uri,
        },
    };

    let limiter = Arc::new(RateLimiter::default());
    let state = Arc::new(
        AppState::new(
            codec,
            Arc::new(verifier),
            CookieFactory::new(config.secure_cookies()),
            site,
        )
        .with_rate_limiter(limiter.clone()),
    );

    // Drop rate-limit entries whose attempts have all aged out
    let sweep_every = Duration::from_secs(config.rate_limit_sweep_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            let removed = limiter.sweep(Instant::now());
            if removed > 0 {
                tracing::debug!(
                    removed,
                    remaining = limiter.tracked_clients(),
                    "Swept idle rate-limit entries"
                );
            }
        }
    });

    let app = wicket_server::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("listening on http://{}", config.bind);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
