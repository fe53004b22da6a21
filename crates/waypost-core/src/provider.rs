//! The `FacilityProvider` trait and supporting query types.
//!
//! The trait is implemented by the source adapters in `waypost-providers`.
//! The aggregator and the routing layer depend on this abstraction, not on
//! any concrete registry integration.
//!
//! Error policy: once inputs are validated (a [`StateCode`] parses, a query's
//! coordinates are in range), provider methods are infallible from the
//! caller's point of view — upstream failures degrade to empty results inside
//! the adapter, and a missing record is the normal `None` value.

use std::future::Future;

use crate::{
  Error, Result,
  facility::{Category, Coordinates, Facility, SourceRegistry},
};

// ─── State code ──────────────────────────────────────────────────────────────

/// A validated two-letter state code, normalized to uppercase.
///
/// Parsing is the only way to obtain one, so adapters never see a malformed
/// code; anything that is not exactly 2 ASCII letters is a caller-visible
/// input error, never silently corrected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCode(String);

impl StateCode {
  pub fn parse(s: &str) -> Result<Self> {
    let trimmed = s.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
      Ok(Self(trimmed.to_ascii_uppercase()))
    } else {
      Err(Error::InvalidStateCode(s.to_string()))
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::str::FromStr for StateCode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::parse(s)
  }
}

impl std::fmt::Display for StateCode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for a single adapter's [`FacilityProvider::search_nearby`].
///
/// `radius_km` is always kilometres at this boundary; the veterans-facility
/// adapter converts its miles-based public interface before building one of
/// these.
#[derive(Debug, Clone)]
pub struct NearbyQuery {
  pub origin:       Coordinates,
  pub radius_km:    f64,
  /// Adapter-interpreted fine-grained type filters (e.g. USDA office kinds,
  /// the VA facility type). Empty means the adapter's default set.
  pub type_filters: Vec<String>,
  pub limit:        usize,
}

/// Parameters for the aggregator facade: one query fanned out to every
/// adapter whose category is requested.
#[derive(Debug, Clone)]
pub struct AggregateQuery {
  pub origin:     Coordinates,
  pub radius_km:  f64,
  /// Coarse categories to include. Empty means all sources.
  pub categories: Vec<Category>,
  pub limit:      usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over one upstream registry integration.
///
/// All three registry adapters share this contract, so the aggregator can fan
/// a query out without knowing any provider's data shape. All methods return
/// `Send` futures so the trait can be used from multi-threaded async runtimes
/// (tokio with `axum`).
pub trait FacilityProvider: Send + Sync {
  /// Raw upstream record shape this adapter understands.
  type Raw;

  /// The registry this adapter fronts.
  fn registry(&self) -> SourceRegistry;

  /// The coarse category every facility from this adapter carries.
  fn category(&self) -> Category;

  /// Pure mapping from one upstream record to the canonical shape.
  ///
  /// Returns `None` (with a logged warning) for records missing numeric
  /// coordinates or a native identifier; every other missing field falls
  /// back to its documented default. Transforming the same record twice
  /// yields identical facilities.
  fn transform(raw: &Self::Raw) -> Option<Facility>;

  /// Fetch and transform every record the registry holds for a state.
  ///
  /// `type_filters` carries the same adapter-interpreted filters as
  /// [`NearbyQuery::type_filters`]; adapters without fine-grained types
  /// ignore it. Upstream failure degrades to an empty vec with a logged
  /// warning — availability is favored over completeness for directory
  /// data.
  fn fetch_by_state<'a>(
    &'a self,
    state: &'a StateCode,
    type_filters: &'a [String],
  ) -> impl Future<Output = Vec<Facility>> + Send + 'a;

  /// Look up one facility by id, with or without the source prefix
  /// (the adapter normalizes). `None` covers both "not found" and a
  /// malformed upstream response.
  fn fetch_details<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Option<Facility>> + Send + 'a;

  /// Fetch, transform, and run the proximity engine: radius filter,
  /// ascending distance sort, truncate to the query's limit.
  fn search_nearby<'a>(
    &'a self,
    query: &'a NearbyQuery,
  ) -> impl Future<Output = Vec<Facility>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn state_code_normalizes_to_uppercase() {
    let code = StateCode::parse("ca").unwrap();
    assert_eq!(code.as_str(), "CA");
  }

  #[test]
  fn state_code_rejects_wrong_length() {
    assert!(matches!(
      StateCode::parse("California"),
      Err(Error::InvalidStateCode(_))
    ));
    assert!(matches!(StateCode::parse(""), Err(Error::InvalidStateCode(_))));
    assert!(matches!(StateCode::parse("C"), Err(Error::InvalidStateCode(_))));
  }

  #[test]
  fn state_code_rejects_non_letters() {
    assert!(matches!(StateCode::parse("C1"), Err(Error::InvalidStateCode(_))));
  }
}
