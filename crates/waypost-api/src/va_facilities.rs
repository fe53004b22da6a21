//! Handlers for `/va-facilities` endpoints.
//!
//! The veterans registry quotes radii in miles, so the proximity route takes
//! `radius_miles` and converts at this boundary; everything below the
//! handlers works in kilometres. `facility_type` selects the upstream
//! facility class (`health`, `benefits`, `cemetery`, `vet_center`).

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;
use waypost_core::{
  facility::Coordinates,
  geo,
  provider::{FacilityProvider, NearbyQuery, StateCode},
};
use waypost_providers::aggregate::Aggregator;

use crate::{
  envelope::{DetailEnvelope, SearchEnvelope},
  error::ApiError,
};

pub const SOURCE: &str = "VA - Department of Veterans Affairs";

const DEFAULT_RADIUS_MILES: f64 = 50.0;
const DEFAULT_FACILITY_TYPE: &str = "health";
const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 50;
const DEFAULT_STATE_LIMIT: usize = 200;
const MAX_STATE_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
  pub latitude:      f64,
  pub longitude:     f64,
  pub radius_miles:  Option<f64>,
  pub facility_type: Option<String>,
  pub limit:         Option<usize>,
}

/// `GET /va-facilities?latitude=..&longitude=..[&radius_miles=..][&facility_type=health][&limit=..]`
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
  let radius_miles = params.radius_miles.unwrap_or(DEFAULT_RADIUS_MILES);
  let facility_type = params
    .facility_type
    .unwrap_or_else(|| DEFAULT_FACILITY_TYPE.to_string());
  let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

  let query = NearbyQuery {
    origin,
    radius_km: geo::miles_to_km(radius_miles),
    type_filters: vec![facility_type.clone()],
    limit,
  };
  let data = agg.va().search_nearby(&query).await;

  Ok(Json(SearchEnvelope::nearby(
    data,
    json!({
      "latitude": params.latitude,
      "longitude": params.longitude,
      "radius_miles": radius_miles,
      "facility_type": facility_type,
      "limit": limit,
    }),
    SOURCE,
  )))
}

#[derive(Debug, Deserialize)]
pub struct StateParams {
  pub facility_type: Option<String>,
  pub limit:         Option<usize>,
}

/// `GET /va-facilities/state/{state_code}[?facility_type=health][&limit=..]`
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
  let facility_type = params
    .facility_type
    .unwrap_or_else(|| DEFAULT_FACILITY_TYPE.to_string());
  let limit = params.limit.unwrap_or(DEFAULT_STATE_LIMIT).min(MAX_STATE_LIMIT);

  let filters = [facility_type];
  let mut data = agg.va().fetch_by_state(&state, &filters).await;
  let total_available = data.len();
  data.truncate(limit);

  Ok(Json(SearchEnvelope::by_state(
    data,
    total_available,
    state.to_string(),
    SOURCE,
  )))
}

/// `GET /va-facilities/{id}` — accepts `va_998` or bare `998`.
pub async fn details<H, V, U>(
  State(agg): State<Arc<Aggregator<H, V, U>>>,
  Path(id): Path<String>,
) -> Result<Json<DetailEnvelope>, ApiError>
where
  H: FacilityProvider + 'static,
  V: FacilityProvider + 'static,
  U: FacilityProvider + 'static,
{
  match agg.va().fetch_details(&id).await {
    Some(facility) => Ok(Json(DetailEnvelope::new(facility, SOURCE))),
    None => Err(ApiError::NotFound(format!(
      "VA facility with ID {id} not found"
    ))),
  }
}
