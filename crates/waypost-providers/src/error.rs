//! Error types for `waypost-providers`.
//!
//! Constructor-time failures only. Once an adapter is built, upstream errors
//! are recovered internally (logged, degraded to empty results) and never
//! reach this type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build upstream HTTP client: {0}")]
  HttpClient(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
