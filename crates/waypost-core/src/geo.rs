//! Distance calculator and proximity query engine.
//!
//! The engine is pure and decoupled from any provider: adapters run it over
//! their own transformed batches, and the aggregator re-runs the sort and
//! truncation steps over merged, already-annotated result sets.

use crate::facility::{Coordinates, Facility};

/// Mean Earth radius (IUGG), kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Statute miles to kilometres, as the veterans-facility API quotes radii.
pub const KM_PER_MILE: f64 = 1.60934;

// ─── Distance ────────────────────────────────────────────────────────────────

/// Great-circle distance between two points, in kilometres (haversine).
///
/// Deterministic and symmetric for any in-range input; callers must have
/// already excluded records without valid coordinates.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
  let lat_a = a.latitude.to_radians();
  let lat_b = b.latitude.to_radians();
  let d_lat = (b.latitude - a.latitude).to_radians();
  let d_lon = (b.longitude - a.longitude).to_radians();

  let h = (d_lat / 2.0).sin().powi(2)
    + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

  2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

pub fn miles_to_km(miles: f64) -> f64 {
  miles * KM_PER_MILE
}

/// Round to two decimals for display, matching the precision the upstream
/// integrations report.
fn round_2dp(km: f64) -> f64 {
  (km * 100.0).round() / 100.0
}

// ─── Proximity query engine ──────────────────────────────────────────────────

/// Filter `facilities` to those within `radius_km` of `origin`, annotate each
/// with its distance, sort ascending, and truncate to `limit`.
///
/// Steps, in order: drop facilities without valid coordinates; compute the
/// distance for every remaining facility; keep `distance <= radius_km`
/// (inclusive boundary, compared before display rounding); stable ascending
/// sort so equal distances preserve discovery order; take the first `limit`.
/// `limit == 0` yields an empty vec, not an error.
pub fn filter_and_rank(
  facilities: Vec<Facility>,
  origin: Coordinates,
  radius_km: f64,
  limit: usize,
) -> Vec<Facility> {
  let hits: Vec<Facility> = facilities
    .into_iter()
    .filter(|f| f.coordinates.is_valid())
    .filter_map(|mut f| {
      let d = distance_km(f.coordinates, origin);
      (d <= radius_km).then(|| {
        f.distance_km = Some(round_2dp(d));
        f
      })
    })
    .collect();

  rank_merged(hits, limit)
}

/// Re-run the sort + truncate steps over already-annotated results.
///
/// Used by the aggregator after concatenating per-adapter partial results so
/// the final limit is global, not per-adapter. Facilities without an attached
/// distance sort last.
pub fn rank_merged(mut facilities: Vec<Facility>, limit: usize) -> Vec<Facility> {
  facilities.sort_by(|a, b| {
    let da = a.distance_km.unwrap_or(f64::INFINITY);
    let db = b.distance_km.unwrap_or(f64::INFINITY);
    da.total_cmp(&db)
  });
  facilities.truncate(limit);
  facilities
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::facility::{
    Accessibility, Address, Category, Contact, Facility, Hours,
    SourceRegistry, Verification,
  };

  fn facility(id: &str, latitude: f64, longitude: f64) -> Facility {
    Facility {
      id:            id.to_string(),
      name:          format!("Facility {id}"),
      category:      Category::HealthCenter,
      subcategory:   "community_health_center".to_string(),
      coordinates:   Coordinates::new(latitude, longitude),
      address:       Address::default(),
      contact:       Contact::default(),
      services:      vec![],
      hours:         Hours::weekday_schedule("8:00 AM - 5:00 PM", ""),
      accessibility: Accessibility::default(),
      verification:  Verification::registry(SourceRegistry::Hrsa, ""),
      metadata:      json!({}),
      distance_km:   None,
    }
  }

  const ORIGIN: Coordinates = Coordinates {
    latitude:  40.0,
    longitude: -75.0,
  };

  #[test]
  fn distance_is_symmetric() {
    let a = Coordinates::new(40.0, -75.0);
    let b = Coordinates::new(37.77, -122.42);
    assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
  }

  #[test]
  fn distance_identity_is_zero() {
    let a = Coordinates::new(51.5, -0.12);
    assert_eq!(distance_km(a, a), 0.0);
  }

  #[test]
  fn distance_known_pair() {
    // One degree of latitude is ~111.19 km on the mean sphere.
    let a = Coordinates::new(40.0, -75.0);
    let b = Coordinates::new(41.0, -75.0);
    let d = distance_km(a, b);
    assert!((d - 111.19).abs() < 0.1, "got {d}");
  }

  #[test]
  fn filter_keeps_only_within_radius_and_sorts() {
    // ~1.4 km and ~14 km from the origin.
    let near = facility("near", 40.01, -74.99);
    let far = facility("far", 40.1, -74.9);

    let out = filter_and_rank(vec![far, near], ORIGIN, 5.0, usize::MAX);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "near");
    let d = out[0].distance_km.unwrap();
    assert!((d - 1.4).abs() < 0.1, "expected ~1.4 km, got {d}");
  }

  #[test]
  fn every_in_radius_facility_with_valid_coords_appears() {
    let facilities = vec![
      facility("a", 40.01, -75.0),
      facility("b", 40.02, -75.0),
      facility("c", 40.03, -75.0),
    ];
    let out = filter_and_rank(facilities, ORIGIN, 10.0, usize::MAX);
    assert_eq!(out.len(), 3);
  }

  #[test]
  fn sort_order_is_non_decreasing() {
    let facilities = vec![
      facility("c", 40.03, -75.0),
      facility("a", 40.01, -75.0),
      facility("b", 40.02, -75.0),
    ];
    let out = filter_and_rank(facilities, ORIGIN, 10.0, usize::MAX);
    let distances: Vec<f64> = out.iter().map(|f| f.distance_km.unwrap()).collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(out[0].id, "a");
    assert_eq!(out[2].id, "c");
  }

  #[test]
  fn radius_boundary_is_inclusive() {
    let exact = facility("exact", 40.01, -75.0);
    let radius = distance_km(exact.coordinates, ORIGIN);
    let out = filter_and_rank(vec![exact], ORIGIN, radius, usize::MAX);
    assert_eq!(out.len(), 1);
  }

  #[test]
  fn limit_truncates_and_zero_limit_is_empty() {
    let facilities = vec![
      facility("a", 40.01, -75.0),
      facility("b", 40.02, -75.0),
      facility("c", 40.03, -75.0),
    ];
    let out = filter_and_rank(facilities.clone(), ORIGIN, 10.0, 2);
    assert_eq!(out.len(), 2);

    let out = filter_and_rank(facilities, ORIGIN, 10.0, 0);
    assert!(out.is_empty());
  }

  #[test]
  fn invalid_coordinates_are_dropped() {
    let bogus = facility("bogus", f64::NAN, -75.0);
    let out_of_range = facility("range", 91.0, -75.0);
    let good = facility("good", 40.01, -75.0);

    let out =
      filter_and_rank(vec![bogus, out_of_range, good], ORIGIN, 1000.0, usize::MAX);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "good");
  }

  #[test]
  fn equal_distances_preserve_discovery_order() {
    // Mirror points east and west of the origin: identical distance.
    let east = facility("east", 40.0, -74.99);
    let west = facility("west", 40.0, -75.01);
    let out = filter_and_rank(vec![east, west], ORIGIN, 5.0, usize::MAX);
    assert_eq!(out[0].id, "east");
    assert_eq!(out[1].id, "west");
  }

  #[test]
  fn rank_merged_applies_global_order_and_limit() {
    let mut a = facility("a", 40.01, -75.0);
    a.distance_km = Some(3.0);
    let mut b = facility("b", 40.02, -75.0);
    b.distance_km = Some(1.0);
    let mut c = facility("c", 40.03, -75.0);
    c.distance_km = Some(2.0);

    let out = rank_merged(vec![a, b, c], 2);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].id, "b");
    assert_eq!(out[1].id, "c");
  }

  #[test]
  fn miles_conversion_boundary() {
    assert!((miles_to_km(50.0) - 80.467).abs() < 1e-9);
  }
}
