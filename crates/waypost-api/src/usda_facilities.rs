//! Handlers for `/usda-facilities` endpoints.
//!
//! `facility_types` is a comma-separated list of office kinds
//! (`rural_development,snap,fsa,extension,wic`); unknown kinds are dropped
//! by the adapter, and an empty list means its default set.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;
use waypost_core::{
  facility::Coordinates,
  provider::{FacilityProvider, NearbyQuery, StateCode},
};
use waypost_providers::aggregate::Aggregator;

use crate::{
  envelope::{DetailEnvelope, SearchEnvelope},
  error::ApiError,
};

pub const SOURCE: &str = "USDA - United States Department of Agriculture";

const DEFAULT_RADIUS_KM: f64 = 50.0;
const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 50;
const DEFAULT_STATE_LIMIT: usize = 100;
const MAX_STATE_LIMIT: usize = 500;

fn split_types(raw: Option<&str>) -> Vec<String> {
  raw
    .unwrap_or("")
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
  pub latitude:       f64,
  pub longitude:      f64,
  pub radius_km:      Option<f64>,
  /// Comma-separated office kinds, e.g. `rural_development,snap,fsa`.
  pub facility_types: Option<String>,
  pub limit:          Option<usize>,
}

/// `GET /usda-facilities?latitude=..&longitude=..[&radius_km=..][&facility_types=..][&limit=..]`
pub async fn nearby<H, V, U>(
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
  let type_filters = split_types(params.facility_types.as_deref());
  let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

  let query = NearbyQuery {
    origin,
    radius_km,
    type_filters: type_filters.clone(),
    limit,
  };
  let data = agg.usda().search_nearby(&query).await;

  Ok(Json(SearchEnvelope::nearby(
    data,
    json!({
      "latitude": params.latitude,
      "longitude": params.longitude,
      "radius_km": radius_km,
      "facility_types": type_filters,
      "limit": limit,
    }),
    SOURCE,
  )))
}

#[derive(Debug, Deserialize)]
pub struct StateParams {
  pub facility_types: Option<String>,
  pub limit:          Option<usize>,
}

/// `GET /usda-facilities/state/{state_code}[?facility_types=..][&limit=..]`
pub async fn by_state<H, V, U>(
  State(agg): State<Arc<Aggregator<H, V, U>>>,
  Path(state_code): Path<String>,
  Query(params): Query<StateParams>,
) -> Result<Json<SearchEnvelope>, ApiError>
where
  H: FacilityProvider + 'static,
  V: FacilityProvider + 'static,
  U: FacilityProvider + 'static,
{
  let state = StateCode::parse(&state_code)?;
  let type_filters = split_types(params.facility_types.as_deref());
  let limit = params.limit.unwrap_or(DEFAULT_STATE_LIMIT).min(MAX_STATE_LIMIT);

  let mut data = agg.usda().fetch_by_state(&state, &type_filters).await;
  let total_available = data.len();
  data.truncate(limit);

  Ok(Json(SearchEnvelope::by_state(
    data,
    total_available,
    state.to_string(),
    SOURCE,
  )))
}

/// `GET /usda-facilities/{id}` — accepts `usda_snap_7` or bare `snap_7`.
pub async fn details<H, V, U>(
  State(agg): State<Arc<Aggregator<H, V, U>>>,
  Path(id): Path<String>,
) -> Result<Json<DetailEnvelope>, ApiError>
where
  H: FacilityProvider + 'static,
  V: FacilityProvider + 'static,
  U: FacilityProvider + 'static,
{
  match agg.usda().fetch_details(&id).await {
    Some(facility) => Ok(Json(DetailEnvelope::new(facility, SOURCE))),
    None => Err(ApiError::NotFound(format!(
      "USDA facility with ID {id} not found"
    ))),
  }
}
