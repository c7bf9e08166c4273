//! HTTP layer for Hireboard analytics.
//!
//! Exposes an axum [`Router`] serving the engagement-tracking and recruiter
//! dashboard endpoints, backed by any [`AnalyticsStore`]. Every endpoint
//! except `/health` sits behind the bearer-token guard in [`auth`].

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  BoxError, Router,
  error_handling::HandleErrorLayer,
  routing::{get, post},
};
use hireboard_core::store::AnalyticsStore;
use serde::Deserialize;
use tower::{ServiceBuilder, timeout::TimeoutLayer};
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
use handlers::{analytics, tracking};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `HIREBOARD_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  /// Shared HS256 secret; must match the one the login service signs with.
  pub jwt_secret:           String,
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
  /// Lifetime of tokens minted by `hireboard-server issue-token`.
  #[serde(default = "default_token_ttl_minutes")]
  pub token_ttl_minutes:    i64,
}

fn default_request_timeout_secs() -> u64 { 30 }

fn default_token_ttl_minutes() -> i64 { 60 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: AnalyticsStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the analytics server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AnalyticsStore + Clone + 'static,
{
  let timeout = Duration::from_secs(state.config.request_timeout_secs);

  Router::new()
    .route("/health",                               get(handlers::health))
    .route("/analytics/recruiter",                  get(analytics::recruiter::<S>))
    .route("/analytics/jobs/active/count",          get(analytics::active_job_count::<S>))
    .route("/analytics/job/{job_id}/view",          post(tracking::view::<S>))
    .route("/analytics/job/{job_id}/apply-click",   post(tracking::apply_click::<S>))
    .layer(
      ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .layer(TimeoutLayer::new(timeout)),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Render middleware failures in the same JSON envelope as handler errors.
async fn handle_middleware_error(err: BoxError) -> Error {
  if err.is::<tower::timeout::error::Elapsed>() {
    Error::Timeout
  } else {
    Error::Internal(err)
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────
