//! JSON REST API for Waypost.
//!
//! Exposes an axum [`Router`] backed by an
//! [`Aggregator`] over any three [`FacilityProvider`] implementations.
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = waypost_api::api_router(aggregator.clone());
//! ```

pub mod envelope;
pub mod error;
pub mod health_centers;
pub mod nearby;
pub mod usda_facilities;
pub mod va_facilities;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use waypost_core::provider::FacilityProvider;
use waypost_providers::{ProviderConfig, aggregate::Aggregator};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
/// Every field has a default, so an absent file yields a working server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:      String,
  pub port:      u16,
  pub providers: ProviderConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:      "0.0.0.0".to_string(),
      port:      8000,
      providers: ProviderConfig::default(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `aggregator`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<H, V, U>(aggregator: Arc<Aggregator<H, V, U>>) -> Router<()>
where
  H: FacilityProvider + 'static,
  V: FacilityProvider + 'static,
  U: FacilityProvider + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Cross-source facade
    .route("/facilities/nearby", get(nearby::search::<H, V, U>))
    // Health centers
    .route("/health-centers", get(health_centers::nearby::<H, V, U>))
    .route(
      "/health-centers/state/{state_code}",
      get(health_centers::by_state::<H, V, U>),
    )
    .route("/health-centers/{id}", get(health_centers::details::<H, V, U>))
    // VA facilities
    .route("/va-facilities", get(va_facilities::nearby::<H, V, U>))
    .route(
      "/va-facilities/state/{state_code}",
      get(va_facilities::by_state::<H, V, U>),
    )
    .route("/va-facilities/{id}", get(va_facilities::details::<H, V, U>))
    // USDA facilities
    .route("/usda-facilities", get(usda_facilities::nearby::<H, V, U>))
    .route(
      "/usda-facilities/state/{state_code}",
      get(usda_facilities::by_state::<H, V, U>),
    )
    .route("/usda-facilities/{id}", get(usda_facilities::details::<H, V, U>))
    .with_state(aggregator)
}

/// `GET /health` — liveness probe.
async fn health() -> Json<Value> {
  Json(json!({ "status": "healthy" }))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
