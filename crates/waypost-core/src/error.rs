//! Error types for `waypost-core`.
//!
//! Only input-validation failures propagate to callers. Upstream provider
//! failures and per-record transform failures are recovered inside the
//! adapters and never surface here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("state code must be exactly 2 letters (e.g. 'CA', 'NY'), got {0:?}")]
  InvalidStateCode(String),

  #[error("coordinates out of range: latitude {latitude}, longitude {longitude}")]
  InvalidCoordinates { latitude: f64, longitude: f64 },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
