//! Handler for `GET /facilities/nearby` — the cross-source facade.
//!
//! `categories` is a comma-separated list of coarse categories
//! (`health_center,va_facility,usda_facility`); omitting it searches every
//! source. Results from all requested adapters are merged, re-sorted by
//! distance, and truncated to one global limit.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use serde_json::json;
use waypost_core::{
  facility::{Category, Coordinates},
  provider::{AggregateQuery, FacilityProvider},
};
use waypost_providers::aggregate::Aggregator;

use crate::{envelope::SearchEnvelope, error::ApiError};

pub const SOURCE: &str = "Aggregated: HRSA, VA, USDA";

const DEFAULT_RADIUS_KM: f64 = 25.0;
const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
  pub latitude:   f64,
  pub longitude:  f64,
  pub radius_km:  Option<f64>,
  /// Comma-separated categories, e.g. `health_center,va_facility`.
  pub categories: Option<String>,
  pub limit:      Option<usize>,
}

fn parse_categories(raw: Option<&str>) -> Result<Vec<Category>, ApiError> {
  raw
    .unwrap_or("")
    .split(',')
    .map(str::trim)
    .filter(|c| !c.is_empty())
    .map(|c| {
      Category::parse(c)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown category: {c}")))
    })
    .collect()
}

/// `GET /facilities/nearby?latitude=..&longitude=..[&radius_km=..][&categories=..][&limit=..]`
pub async fn search<H, V, U>(
  State(agg): State<Arc<Aggregator<H, V, U>>>,
  Query(params): Query<NearbyParams>,
) -> Result<Json<SearchEnvelope>, ApiError>
where
  H: FacilityProvider + 'static,
  V: FacilityProvider + 'static,
  U: FacilityProvider + 'static,
{
  let origin = Coordinates::validated(params.latitude, params.longitude)?;
  let radius_km = params.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
  let categories = parse_categories(params.categories.as_deref())?;
  let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

  let query = AggregateQuery {
    origin,
    radius_km,
    categories: categories.clone(),
    limit,
  };
  let data = agg.search_nearby(&query).await;

  Ok(Json(SearchEnvelope::nearby(
    data,
    json!({
      "latitude": params.latitude,
      "longitude": params.longitude,
      "radius_km": radius_km,
      "categories": categories.iter().map(Category::as_str).collect::<Vec<_>>(),
      "limit": limit,
    }),
    SOURCE,
  )))
}
