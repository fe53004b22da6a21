//! Aggregator facade over the three registry adapters.
//!
//! Fans one query out to every adapter whose category is requested, issues
//! the upstream calls concurrently, merges the partial result sets, and
//! re-applies the sort and limit globally. One adapter coming back empty —
//! its failure mode — never blocks the others' results.

use waypost_core::{
  facility::{Category, Facility},
  geo,
  provider::{AggregateQuery, FacilityProvider, NearbyQuery, StateCode},
};

use crate::{hrsa, usda, va};

/// The facade the routing layer talks to. Generic over the three adapters so
/// tests can substitute stubs.
pub struct Aggregator<H, V, U> {
  hrsa: H,
  va:   V,
  usda: U,
}

impl<H, V, U> Aggregator<H, V, U>
where
  H: FacilityProvider,
  V: FacilityProvider,
  U: FacilityProvider,
{
  pub fn new(hrsa: H, va: V, usda: U) -> Self {
    Self { hrsa, va, usda }
  }

  pub fn hrsa(&self) -> &H {
    &self.hrsa
  }

  pub fn va(&self) -> &V {
    &self.va
  }

  pub fn usda(&self) -> &U {
    &self.usda
  }

  fn wants(categories: &[Category], category: Category) -> bool {
    categories.is_empty() || categories.contains(&category)
  }

  /// Fan out, merge, re-sort, and apply the global limit.
  pub async fn search_nearby(&self, query: &AggregateQuery) -> Vec<Facility> {
    let per_adapter = NearbyQuery {
      origin:       query.origin,
      radius_km:    query.radius_km,
      type_filters: Vec::new(),
      limit:        query.limit,
    };

    let hrsa_results = async {
      if Self::wants(&query.categories, Category::HealthCenter) {
        self.hrsa.search_nearby(&per_adapter).await
      } else {
        Vec::new()
      }
    };
    let va_results = async {
      if Self::wants(&query.categories, Category::VaFacility) {
        self.va.search_nearby(&per_adapter).await
      } else {
        Vec::new()
      }
    };
    let usda_results = async {
      if Self::wants(&query.categories, Category::UsdaFacility) {
        self.usda.search_nearby(&per_adapter).await
      } else {
        Vec::new()
      }
    };

    let (mut merged, from_va, from_usda) =
      tokio::join!(hrsa_results, va_results, usda_results);
    merged.extend(from_va);
    merged.extend(from_usda);

    geo::rank_merged(merged, query.limit)
  }

  /// Route a detail lookup on its id prefix. Ids without a known prefix
  /// cannot be dispatched and resolve to not-found.
  pub async fn fetch_details(&self, id: &str) -> Option<Facility> {
    if id.starts_with(hrsa::ID_PREFIX) {
      self.hrsa.fetch_details(id).await
    } else if id.starts_with(va::ID_PREFIX) {
      self.va.fetch_details(id).await
    } else if id.starts_with(usda::ID_PREFIX) {
      self.usda.fetch_details(id).await
    } else {
      tracing::warn!(id, "detail lookup with unknown source prefix");
      None
    }
  }

  /// Concurrent state query across every requested category.
  pub async fn fetch_by_state(
    &self,
    state: &StateCode,
    categories: &[Category],
  ) -> Vec<Facility> {
    let hrsa_results = async {
      if Self::wants(categories, Category::HealthCenter) {
        self.hrsa.fetch_by_state(state, &[]).await
      } else {
        Vec::new()
      }
    };
    let va_results = async {
      if Self::wants(categories, Category::VaFacility) {
        self.va.fetch_by_state(state, &[]).await
      } else {
        Vec::new()
      }
    };
    let usda_results = async {
      if Self::wants(categories, Category::UsdaFacility) {
        self.usda.fetch_by_state(state, &[]).await
      } else {
        Vec::new()
      }
    };

    let (mut merged, from_va, from_usda) =
      tokio::join!(hrsa_results, va_results, usda_results);
    merged.extend(from_va);
    merged.extend(from_usda);
    merged
  }
}
