//! Request handlers, the shared response [`Envelope`] and `GET /health`.

pub mod analytics;
pub mod tracking;

use axum::Json;
use serde::Serialize;

/// Uniform success envelope: `{success, message, data?}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub success: bool,
  pub message: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
}

impl<T> Envelope<T> {
  pub fn ok(message: &'static str, data: T) -> Json<Self> {
    Json(Self { success: true, message, data: Some(data) })
  }
}

/// `GET /health`: liveness only; touches neither the store nor auth.
pub async fn health() -> Json<Envelope<()>> {
  Json(Envelope { success: true, message: "OK", data: None })
}
