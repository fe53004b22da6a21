//! Handlers for `/health-centers` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/health-centers` | Proximity query; `radius_km` default 25 |
//! | `GET`  | `/health-centers/state/{state_code}` | Full state listing |
//! | `GET`  | `/health-centers/{id}` | Detail; id with or without `hrsa_` |

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

pub const SOURCE: &str = "HRSA - Health Resources & Services Administration";

const DEFAULT_RADIUS_KM: f64 = 25.0;
const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 50;
const DEFAULT_STATE_LIMIT: usize = 100;
const MAX_STATE_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
  pub latitude:  f64,
  pub longitude: f64,
  pub radius_km: Option<f64>,
  pub limit:     Option<usize>,
}

/// `GET /health-centers?latitude=..&longitude=..[&radius_km=..][&limit=..]`
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
  let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

  let query = NearbyQuery {
    origin,
    radius_km,
    type_filters: Vec::new(),
    limit,
  };
  let data = agg.hrsa().search_nearby(&query).await;

  Ok(Json(SearchEnvelope::nearby(
    data,
    json!({
      "latitude": params.latitude,
      "longitude": params.longitude,
      "radius_km": radius_km,
      "limit": limit,
    }),
    SOURCE,
  )))
}

#[derive(Debug, Deserialize)]
pub struct StateParams {
  pub limit: Option<usize>,
}

/// `GET /health-centers/state/{state_code}[?limit=..]`
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
  let limit = params.limit.unwrap_or(DEFAULT_STATE_LIMIT).min(MAX_STATE_LIMIT);

  let mut data = agg.hrsa().fetch_by_state(&state, &[]).await;
  let total_available = data.len();
  data.truncate(limit);

  Ok(Json(SearchEnvelope::by_state(
    data,
    total_available,
    state.to_string(),
    SOURCE,
  )))
}

/// `GET /health-centers/{id}` — accepts `hrsa_12345` or bare `12345`.
pub async fn details<H, V, U>(
  State(agg): State<Arc<Aggregator<H, V, U>>>,
  Path(id): Path<String>,
) -> Result<Json<DetailEnvelope>, ApiError>
where
  H: FacilityProvider + 'static,
  V: FacilityProvider + 'static,
  U: FacilityProvider + 'static,
{
  match agg.hrsa().fetch_details(&id).await {
    Some(facility) => Ok(Json(DetailEnvelope::new(facility, SOURCE))),
    None => Err(ApiError::NotFound(format!(
      "health center with ID {id} not found"
    ))),
  }
}
