//! Response envelopes shared by every facility endpoint.
//!
//! All list endpoints reply `{status, data, count, ..., source}`; by-state
//! queries additionally report `total_available` (the pre-limit count) and
//! echo the state, while proximity queries echo their `search_params`.

use serde::Serialize;
use serde_json::Value;
use waypost_core::facility::Facility;

/// Envelope for list responses (proximity and by-state queries).
#[derive(Debug, Serialize)]
pub struct SearchEnvelope {
  pub status:          &'static str,
  pub data:            Vec<Facility>,
  pub count:           usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total_available: Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub state:           Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub search_params:   Option<Value>,
  pub source:          &'static str,
}

impl SearchEnvelope {
  /// Envelope for a proximity query, echoing its parameters.
  pub fn nearby(data: Vec<Facility>, search_params: Value, source: &'static str) -> Self {
    Self {
      status: "success",
      count: data.len(),
      data,
      total_available: None,
      state: None,
      search_params: Some(search_params),
      source,
    }
  }

  /// Envelope for a by-state query. `total_available` is the count before
  /// the limit was applied.
  pub fn by_state(
    data: Vec<Facility>,
    total_available: usize,
    state: String,
    source: &'static str,
  ) -> Self {
    Self {
      status: "success",
      count: data.len(),
      data,
      total_available: Some(total_available),
      state: Some(state),
      search_params: None,
      source,
    }
  }
}

/// Envelope for single-facility detail responses.
#[derive(Debug, Serialize)]
pub struct DetailEnvelope {
  pub status: &'static str,
  pub data:   Facility,
  pub source: &'static str,
}

impl DetailEnvelope {
  pub fn new(data: Facility, source: &'static str) -> Self {
    Self {
      status: "success",
      data,
      source,
    }
  }
}
