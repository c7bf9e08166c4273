//! Error type for `hireboard-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] hireboard_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored identifier is empty, which the schema should make impossible.
  #[error("invalid stored identifier in {0}")]
  InvalidId(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
