//! The canonical facility schema.
//!
//! Every upstream registry record is mapped into a [`Facility`] by its source
//! adapter. A facility is synthesized fresh on every fetch and never mutated
//! afterwards; the only post-construction annotation is `distance_km`, which
//! the proximity engine attaches per query.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Coordinates ─────────────────────────────────────────────────────────────

/// A point in decimal degrees.
///
/// Adapters reject provider records without numeric coordinates, so a
/// constructed facility always carries a pair — but upstream floats can still
/// be out of range or non-finite, which [`Coordinates::is_valid`] guards at
/// query time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub latitude:  f64,
  pub longitude: f64,
}

impl Coordinates {
  pub fn new(latitude: f64, longitude: f64) -> Self {
    Self {
      latitude,
      longitude,
    }
  }

  /// Construct a pair, rejecting non-finite or out-of-range values.
  pub fn validated(latitude: f64, longitude: f64) -> Result<Self> {
    let c = Self::new(latitude, longitude);
    if c.is_valid() {
      Ok(c)
    } else {
      Err(Error::InvalidCoordinates {
        latitude,
        longitude,
      })
    }
  }

  pub fn is_valid(&self) -> bool {
    self.latitude.is_finite()
      && self.longitude.is_finite()
      && (-90.0..=90.0).contains(&self.latitude)
      && (-180.0..=180.0).contains(&self.longitude)
  }
}

// ─── Classification ──────────────────────────────────────────────────────────

/// The coarse facility type. Each adapter produces exactly one category;
/// `Utility` covers user-submitted amenities outside the registry adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  HealthCenter,
  VaFacility,
  UsdaFacility,
  Utility,
}

impl Category {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::HealthCenter => "health_center",
      Self::VaFacility => "va_facility",
      Self::UsdaFacility => "usda_facility",
      Self::Utility => "utility",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "health_center" => Some(Self::HealthCenter),
      "va_facility" => Some(Self::VaFacility),
      "usda_facility" => Some(Self::UsdaFacility),
      "utility" => Some(Self::Utility),
      _ => None,
    }
  }
}

impl std::fmt::Display for Category {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The registry (or submission channel) a facility originated from.
/// Serialized forms mirror the attribution strings the providers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceRegistry {
  #[serde(rename = "HRSA")]
  Hrsa,
  #[serde(rename = "VA")]
  Va,
  #[serde(rename = "USDA")]
  Usda,
  #[serde(rename = "user-submitted")]
  UserSubmitted,
}

// ─── Nested record fields ────────────────────────────────────────────────────

/// Postal address. Every sub-field is independently optional upstream and
/// defaults to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
  pub street:   String,
  pub city:     String,
  pub state:    String,
  pub zip_code: String,
  pub county:   String,
}

/// Contact channels, empty-string defaulted like [`Address`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
  pub phone:   String,
  pub website: String,
  pub email:   String,
}

/// Weekly operating hours as display strings, plus a free-text note.
/// Defaults differ per source registry and are supplied by the adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hours {
  pub monday:    String,
  pub tuesday:   String,
  pub wednesday: String,
  pub thursday:  String,
  pub friday:    String,
  pub saturday:  String,
  pub sunday:    String,
  pub notes:     String,
}

impl Hours {
  /// A uniform weekday schedule with closed weekends — the shape every
  /// registry falls back to when the provider omits hours.
  pub fn weekday_schedule(weekday: &str, notes: &str) -> Self {
    Self {
      monday:    weekday.to_string(),
      tuesday:   weekday.to_string(),
      wednesday: weekday.to_string(),
      thursday:  weekday.to_string(),
      friday:    weekday.to_string(),
      saturday:  "Closed".to_string(),
      sunday:    "Closed".to_string(),
      notes:     notes.to_string(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Accessibility {
  pub wheelchair_accessible: bool,
  pub public_transit:        bool,
}

/// Provenance of the record. The three government registries are treated as
/// authoritative, so their adapters set `verified = true` unconditionally;
/// only user-submitted records may be unverified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
  pub verified:     bool,
  pub source:       SourceRegistry,
  /// Opaque provider-supplied date string; empty when the provider omits it.
  pub last_updated: String,
}

impl Verification {
  pub fn registry(source: SourceRegistry, last_updated: impl Into<String>) -> Self {
    Self {
      verified: true,
      source,
      last_updated: last_updated.into(),
    }
  }

  pub fn user_submitted(last_updated: impl Into<String>) -> Self {
    Self {
      verified: false,
      source: SourceRegistry::UserSubmitted,
      last_updated: last_updated.into(),
    }
  }
}

// ─── Facility ────────────────────────────────────────────────────────────────

/// The canonical entity every source adapter produces.
///
/// `id` is `{source_prefix}_{provider_native_id}` (e.g. `hrsa_12345`,
/// `va_998`, `usda_snap_7`): the prefix unambiguously identifies the origin
/// adapter and is stable across repeated fetches of the same provider record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
  pub id:            String,
  pub name:          String,
  pub category:      Category,
  pub subcategory:   String,
  pub coordinates:   Coordinates,
  pub address:       Address,
  pub contact:       Contact,
  pub services:      Vec<String>,
  pub hours:         Hours,
  pub accessibility: Accessibility,
  pub verification:  Verification,
  /// Adapter-specific bag (grant info, VISN, programs, languages) — opaque
  /// to the proximity engine.
  pub metadata:      serde_json::Value,
  /// Attached transiently by a proximity query; absent on the canonical
  /// record.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub distance_km:   Option<f64>,
}
