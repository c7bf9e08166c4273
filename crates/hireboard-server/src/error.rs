//! Error types and axum `IntoResponse` implementation.
//!
//! Every failure is rendered as the same JSON envelope the success paths use,
//! with `success: false` and a human-readable `message`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("authentication required")]
  MissingToken,
  #[error("invalid or expired token")]
  InvalidToken,
  #[error("forbidden: {0}")]
  Forbidden(&'static str),
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("request timed out")]
  Timeout,
  /// `context` is the message shown to the caller; `source` is only logged.
  #[error("{context}: {source}")]
  Storage {
    context: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },
  /// A middleware failure other than a timeout; only logged.
  #[error("internal error: {0}")]
  Internal(#[source] axum::BoxError),
}

impl Error {
  /// Translate a core error raised while serving the request described by
  /// `context` (e.g. "Failed to track job view").
  pub fn from_core(err: hireboard_core::Error, context: &'static str) -> Self {
    match err {
      hireboard_core::Error::MissingJobId => Error::BadRequest("Job ID is required".to_string()),
      hireboard_core::Error::MissingUserId => {
        Error::BadRequest("User ID is required for tracking".to_string())
      }
      hireboard_core::Error::Storage(source) => Error::Storage { context, source },
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      Error::MissingToken => (StatusCode::UNAUTHORIZED, "Authentication required".to_string()),
      Error::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token".to_string()),
      Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_string()),
      Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
      Error::Timeout => (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string()),
      Error::Storage { context, source } => {
        tracing::error!(error = %source, "{context}");
        (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
      }
      Error::Internal(source) => {
        tracing::error!(error = %source, "unhandled middleware error");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
      }
    };
    (status, Json(json!({ "success": false, "message": message }))).into_response()
  }
}
