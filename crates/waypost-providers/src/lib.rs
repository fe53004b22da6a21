//! Source adapters for the Waypost facility directory.
//!
//! One adapter per upstream registry family — HRSA health centers
//! ([`hrsa::HrsaDirectory`]), VA facilities ([`va::VaFacilities`]), and USDA
//! offices ([`usda::UsdaOffices`]) — each isolating its provider's data shape
//! behind [`waypost_core::provider::FacilityProvider`]. The
//! [`aggregate::Aggregator`] facade fans a single query out across all three.

pub mod aggregate;
pub mod error;
pub mod hrsa;
pub mod raw;
pub mod usda;
pub mod va;

mod http;

pub use error::{Error, Result};

use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Upstream base URLs, deserialised from the server's `config.toml`.
/// Every field defaults to the public registry endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
  pub hrsa_base_url: String,
  pub va_base_url:   String,
  pub usda_base_url: String,
}

impl Default for ProviderConfig {
  fn default() -> Self {
    Self {
      hrsa_base_url: "https://data.hrsa.gov".to_string(),
      va_base_url:   "https://api.va.gov".to_string(),
      usda_base_url: "https://www.usda.gov".to_string(),
    }
  }
}

#[cfg(test)]
mod tests;
