//! Aggregator tests against stub providers.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use waypost_core::{
  facility::{
    Accessibility, Address, Category, Contact, Coordinates, Facility, Hours,
    SourceRegistry, Verification,
  },
  geo,
  provider::{AggregateQuery, FacilityProvider, NearbyQuery, StateCode},
};

use crate::aggregate::Aggregator;

fn facility(id: &str, category: Category, latitude: f64, longitude: f64) -> Facility {
  let source = match category {
    Category::HealthCenter => SourceRegistry::Hrsa,
    Category::VaFacility => SourceRegistry::Va,
    Category::UsdaFacility => SourceRegistry::Usda,
    Category::Utility => SourceRegistry::UserSubmitted,
  };
  Facility {
    id:            id.to_string(),
    name:          format!("Facility {id}"),
    category,
    subcategory:   String::new(),
    coordinates:   Coordinates::new(latitude, longitude),
    address:       Address::default(),
    contact:       Contact::default(),
    services:      vec![],
    hours:         Hours::weekday_schedule("8:00 AM - 4:30 PM", ""),
    accessibility: Accessibility::default(),
    verification:  Verification::registry(source, ""),
    metadata:      json!({}),
    distance_km:   None,
  }
}

/// In-memory provider holding a fixed dataset; records how often its
/// upstream-facing operations run.
struct StubProvider {
  category:   Category,
  registry:   SourceRegistry,
  facilities: Vec<Facility>,
  calls:      AtomicUsize,
}

impl StubProvider {
  fn new(category: Category, registry: SourceRegistry, facilities: Vec<Facility>) -> Self {
    Self {
      category,
      registry,
      facilities,
      calls: AtomicUsize::new(0),
    }
  }

  fn call_count(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

impl FacilityProvider for StubProvider {
  type Raw = Facility;

  fn registry(&self) -> SourceRegistry {
    self.registry
  }

  fn category(&self) -> Category {
    self.category
  }

  fn transform(raw: &Facility) -> Option<Facility> {
    Some(raw.clone())
  }

  async fn fetch_by_state<'a>(
    &'a self,
    _state: &'a StateCode,
    _type_filters: &'a [String],
  ) -> Vec<Facility> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self.facilities.clone()
  }

  async fn fetch_details<'a>(&'a self, id: &'a str) -> Option<Facility> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    self.facilities.iter().find(|f| f.id == id).cloned()
  }

  async fn search_nearby<'a>(&'a self, query: &'a NearbyQuery) -> Vec<Facility> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    geo::filter_and_rank(
      self.facilities.clone(),
      query.origin,
      query.radius_km,
      query.limit,
    )
  }
}

const ORIGIN: Coordinates = Coordinates {
  latitude:  40.0,
  longitude: -75.0,
};

fn aggregator() -> Aggregator<StubProvider, StubProvider, StubProvider> {
  // Interleaved distances across sources: hrsa ~1.1 km and ~4.4 km,
  // va ~2.2 km, usda ~3.3 km.
  Aggregator::new(
    StubProvider::new(Category::HealthCenter, SourceRegistry::Hrsa, vec![
      facility("hrsa_1", Category::HealthCenter, 40.01, -75.0),
      facility("hrsa_2", Category::HealthCenter, 40.04, -75.0),
    ]),
    StubProvider::new(Category::VaFacility, SourceRegistry::Va, vec![facility(
      "va_1",
      Category::VaFacility,
      40.02,
      -75.0,
    )]),
    StubProvider::new(Category::UsdaFacility, SourceRegistry::Usda, vec![
      facility("usda_snap_1", Category::UsdaFacility, 40.03, -75.0),
    ]),
  )
}

fn query(radius_km: f64, categories: Vec<Category>, limit: usize) -> AggregateQuery {
  AggregateQuery {
    origin: ORIGIN,
    radius_km,
    categories,
    limit,
  }
}

#[tokio::test]
async fn merges_and_resorts_across_adapters() {
  let agg = aggregator();
  let out = agg.search_nearby(&query(50.0, vec![], 10)).await;

  let ids: Vec<&str> = out.iter().map(|f| f.id.as_str()).collect();
  assert_eq!(ids, vec!["hrsa_1", "va_1", "usda_snap_1", "hrsa_2"]);

  let distances: Vec<f64> = out.iter().map(|f| f.distance_km.unwrap()).collect();
  assert!(distances.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn limit_is_global_not_per_adapter() {
  let agg = aggregator();
  let out = agg.search_nearby(&query(50.0, vec![], 2)).await;
  let ids: Vec<&str> = out.iter().map(|f| f.id.as_str()).collect();
  assert_eq!(ids, vec!["hrsa_1", "va_1"]);
}

#[tokio::test]
async fn category_filter_skips_unrequested_adapters() {
  let agg = aggregator();
  let out = agg
    .search_nearby(&query(50.0, vec![Category::VaFacility], 10))
    .await;

  assert_eq!(out.len(), 1);
  assert_eq!(out[0].id, "va_1");
  assert_eq!(agg.hrsa().call_count(), 0);
  assert_eq!(agg.usda().call_count(), 0);
  assert_eq!(agg.va().call_count(), 1);
}

#[tokio::test]
async fn empty_adapter_does_not_block_others() {
  let agg = Aggregator::new(
    StubProvider::new(Category::HealthCenter, SourceRegistry::Hrsa, vec![]),
    StubProvider::new(Category::VaFacility, SourceRegistry::Va, vec![facility(
      "va_1",
      Category::VaFacility,
      40.01,
      -75.0,
    )]),
    StubProvider::new(Category::UsdaFacility, SourceRegistry::Usda, vec![]),
  );
  let out = agg.search_nearby(&query(50.0, vec![], 10)).await;
  assert_eq!(out.len(), 1);
  assert_eq!(out[0].id, "va_1");
}

#[tokio::test]
async fn radius_filter_applies_before_merge() {
  let agg = aggregator();
  // Only hrsa_1 (~1.1 km) is inside 2 km.
  let out = agg.search_nearby(&query(2.0, vec![], 10)).await;
  assert_eq!(out.len(), 1);
  assert_eq!(out[0].id, "hrsa_1");
}

#[tokio::test]
async fn details_route_on_id_prefix() {
  let agg = aggregator();
  assert_eq!(agg.fetch_details("va_1").await.unwrap().id, "va_1");
  assert_eq!(agg.fetch_details("hrsa_2").await.unwrap().id, "hrsa_2");
  assert_eq!(
    agg.fetch_details("usda_snap_1").await.unwrap().id,
    "usda_snap_1"
  );
  // No adapter was consulted for an unroutable prefix.
  assert!(agg.fetch_details("osm_12").await.is_none());
}

#[tokio::test]
async fn fetch_by_state_merges_requested_categories() {
  let agg = aggregator();
  let state = StateCode::parse("pa").unwrap();
  let all = agg.fetch_by_state(&state, &[]).await;
  assert_eq!(all.len(), 4);

  let health_only = agg
    .fetch_by_state(&state, &[Category::HealthCenter])
    .await;
  assert_eq!(health_only.len(), 2);
  assert!(health_only.iter().all(|f| f.category == Category::HealthCenter));
}
