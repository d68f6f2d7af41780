//! # wicket-server
//!
//! HTTP front for the Wicket dashboard gate.
//!
//! This crate provides:
//! - Command-line / environment configuration
//! - The login, logout and user endpoints
//! - The session-gated dashboard routes
//! - Security and cache headers for every response
//! - Static file serving for the public site

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod headers;
pub mod routes;
mod state;

pub use config::{Config, DeploymentMode};
pub use error::LoginError;
pub use routes::router;
pub use state::{AppState, ClientConfig, Site};
