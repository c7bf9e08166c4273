//! Error types for `hireboard-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("job id is required")]
  MissingJobId,

  #[error("user id is required for tracking")]
  MissingUserId,

  /// Any failure reported by the backing store. Aggregation aborts on the
  /// first one; no partial metrics are ever returned.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
