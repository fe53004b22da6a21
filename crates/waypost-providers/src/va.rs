//! VA facility registry adapter.
//!
//! Fronts the Department of Veterans Affairs facilities API. Canonical ids
//! are `va_{facility_id}`. The VA API quotes search radii in statute miles;
//! this adapter owns that conversion boundary — everything past its public
//! surface is kilometres.

use serde::Deserialize;
use serde_json::json;
use waypost_core::{
  facility::{
    Accessibility, Address, Category, Contact, Coordinates, Facility,
    SourceRegistry, Verification,
  },
  geo,
  provider::{FacilityProvider, NearbyQuery, StateCode},
};

use crate::{
  ProviderConfig, Result,
  http::UpstreamClient,
  raw::{RawHours, coerce_f64, coerce_id, name_or},
};

pub const ID_PREFIX: &str = "va_";

const FACILITIES_PATH: &str = "/v0/facilities/va";

/// Per-page ceiling the VA API accepts on state queries.
const STATE_PAGE_SIZE: u32 = 200;

const DEFAULT_FACILITY_TYPE: &str = "health";
const WEEKDAY_HOURS: &str = "8:00 AM - 4:30 PM";
const HOURS_NOTES: &str = "Emergency services available 24/7 at medical centers";

/// Services every VA facility offers.
const BASE_SERVICES: &[&str] = &[
  "Primary Care",
  "Mental Health Services",
  "Specialty Care",
  "Emergency Services",
  "Pharmacy Services",
  "Laboratory Services",
  "Radiology Services",
];

const MEDICAL_CENTER_SERVICES: &[&str] = &[
  "Inpatient Care",
  "Surgical Services",
  "ICU/Critical Care",
  "Rehabilitation Services",
];

const VET_CENTER_SERVICES: &[&str] = &[
  "PTSD Counseling",
  "Readjustment Counseling",
  "Family Counseling",
  "Group Therapy",
];

// ─── Raw record ──────────────────────────────────────────────────────────────

/// One record from the VA facilities API: an id envelope around an
/// `attributes` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaRecord {
  #[serde(default)]
  pub id:         Option<serde_json::Value>,
  #[serde(default)]
  pub attributes: VaAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaAttributes {
  #[serde(default)]
  pub name:             Option<String>,
  #[serde(default)]
  pub lat:              Option<serde_json::Value>,
  #[serde(default)]
  pub long:             Option<serde_json::Value>,
  #[serde(default)]
  pub address:          VaAddressBlock,
  #[serde(default)]
  pub phone:            VaPhone,
  #[serde(default)]
  pub website:          String,
  #[serde(default)]
  pub email:            String,
  #[serde(default)]
  pub facility_type:    String,
  #[serde(default)]
  pub classification:   String,
  #[serde(default)]
  pub visn:             String,
  #[serde(default)]
  pub hours:            RawHours,
  #[serde(default)]
  pub access:           VaAccess,
  #[serde(default)]
  pub operating_status: VaOperatingStatus,
  #[serde(default)]
  pub updated_at:       String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaAddressBlock {
  #[serde(default)]
  pub physical: VaPhysicalAddress,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaPhysicalAddress {
  #[serde(default)]
  pub address_1: String,
  #[serde(default)]
  pub city:      String,
  #[serde(default)]
  pub state:     String,
  #[serde(default)]
  pub zip:       String,
  #[serde(default)]
  pub county:    String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaPhone {
  #[serde(default)]
  pub main: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaAccess {
  #[serde(default)]
  pub public_transport: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaOperatingStatus {
  #[serde(default)]
  pub code:            Option<String>,
  #[serde(default)]
  pub additional_info: String,
}

// ─── Adapter ─────────────────────────────────────────────────────────────────

/// Adapter for the VA facilities registry.
#[derive(Debug, Clone)]
pub struct VaFacilities {
  http:     UpstreamClient,
  base_url: String,
}

impl VaFacilities {
  pub fn new(config: &ProviderConfig) -> Result<Self> {
    Ok(Self {
      http:     UpstreamClient::new()?,
      base_url: config.va_base_url.trim_end_matches('/').to_string(),
    })
  }

  fn subcategory(attributes: &VaAttributes) -> &'static str {
    let facility_type = attributes.facility_type.to_lowercase();
    let classification = attributes.classification.to_lowercase();

    if facility_type.contains("medical center") || classification.contains("vamc") {
      "va_medical_center"
    } else if facility_type.contains("outpatient") || facility_type.contains("clinic") {
      "va_outpatient_clinic"
    } else if facility_type.contains("vet center") {
      "va_vet_center"
    } else if facility_type.contains("regional office") {
      "va_regional_office"
    } else if facility_type.contains("cemetery") {
      "va_cemetery"
    } else {
      "va_facility"
    }
  }

  /// Type-specific services first, then the base list.
  fn services(attributes: &VaAttributes) -> Vec<String> {
    let facility_type = attributes.facility_type.to_lowercase();
    let extension: &[&str] = if facility_type.contains("medical center") {
      MEDICAL_CENTER_SERVICES
    } else if facility_type.contains("vet center") {
      VET_CENTER_SERVICES
    } else {
      &[]
    };
    extension
      .iter()
      .chain(BASE_SERVICES)
      .map(|s| (*s).to_string())
      .collect()
  }

  /// Detail lookups accept either form; strip the prefix when present.
  fn native_id(id: &str) -> &str {
    id.strip_prefix(ID_PREFIX).unwrap_or(id)
  }

  fn records_from_payload(payload: &serde_json::Value) -> Vec<VaRecord> {
    let Some(records) = payload.get("data").and_then(|d| d.as_array()) else {
      tracing::warn!("VA payload missing 'data' array");
      return Vec::new();
    };
    records
      .iter()
      .filter_map(|record| match serde_json::from_value(record.clone()) {
        Ok(record) => Some(record),
        Err(e) => {
          tracing::warn!(error = %e, "skipping malformed VA record");
          None
        }
      })
      .collect()
  }

  async fn nearby(
    &self,
    origin: Coordinates,
    radius_km: f64,
    facility_type: &str,
    limit: usize,
  ) -> Vec<Facility> {
    let url = format!("{}{FACILITIES_PATH}", self.base_url);
    // The upstream radius parameter is miles.
    let params = [
      ("lat", origin.latitude.to_string()),
      ("long", origin.longitude.to_string()),
      ("radius", (radius_km / geo::KM_PER_MILE).to_string()),
      ("type", facility_type.to_string()),
      ("per_page", limit.to_string()),
    ];

    match self.http.get_json(&url, &params).await {
      Ok(payload) => {
        let facilities: Vec<Facility> = Self::records_from_payload(&payload)
          .iter()
          .filter_map(Self::transform)
          .collect();
        tracing::info!(count = facilities.len(), "fetched VA facilities");
        geo::filter_and_rank(facilities, origin, radius_km, limit)
      }
      Err(e) => {
        tracing::warn!(error = %e, "VA fetch failed; returning empty result set");
        Vec::new()
      }
    }
  }

  async fn fetch_by_state_typed(
    &self,
    state: &StateCode,
    facility_type: &str,
  ) -> Vec<Facility> {
    let url = format!("{}{FACILITIES_PATH}", self.base_url);
    let params = [
      ("state", state.as_str().to_string()),
      ("type", facility_type.to_string()),
      ("per_page", STATE_PAGE_SIZE.to_string()),
    ];

    match self.http.get_json(&url, &params).await {
      Ok(payload) => {
        let facilities: Vec<Facility> = Self::records_from_payload(&payload)
          .iter()
          .filter_map(Self::transform)
          .collect();
        tracing::info!(
          state = %state,
          count = facilities.len(),
          "fetched VA facilities"
        );
        facilities
      }
      Err(e) => {
        tracing::warn!(
          state = %state,
          error = %e,
          "VA fetch failed; returning empty result set"
        );
        Vec::new()
      }
    }
  }
}

impl FacilityProvider for VaFacilities {
  type Raw = VaRecord;

  fn registry(&self) -> SourceRegistry {
    SourceRegistry::Va
  }

  fn category(&self) -> Category {
    Category::VaFacility
  }

  fn transform(raw: &VaRecord) -> Option<Facility> {
    let Some(facility_id) = coerce_id(raw.id.as_ref()) else {
      tracing::warn!("VA record missing id; skipping");
      return None;
    };

    let attributes = &raw.attributes;
    let latitude = coerce_f64(attributes.lat.as_ref());
    let longitude = coerce_f64(attributes.long.as_ref());
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
      tracing::warn!(facility_id, "VA record missing numeric coordinates; skipping");
      return None;
    };

    let physical = &attributes.address.physical;
    Some(Facility {
      id:            format!("{ID_PREFIX}{facility_id}"),
      name:          name_or("VA Facility", attributes.name.as_ref()),
      category:      Category::VaFacility,
      subcategory:   Self::subcategory(attributes).to_string(),
      coordinates:   Coordinates::new(latitude, longitude),
      address:       Address {
        street:   physical.address_1.clone(),
        city:     physical.city.clone(),
        state:    physical.state.clone(),
        zip_code: physical.zip.clone(),
        county:   physical.county.clone(),
      },
      contact:       Contact {
        phone:   attributes.phone.main.clone(),
        website: attributes.website.clone(),
        email:   attributes.email.clone(),
      },
      services:      Self::services(attributes),
      // The notes default is fixed for VA; the provider hours block carries
      // no notes field of its own.
      hours:         attributes.hours.resolve(WEEKDAY_HOURS, HOURS_NOTES),
      accessibility: Accessibility {
        // VA facilities are required to be accessible.
        wheelchair_accessible: true,
        public_transit:        attributes.access.public_transport,
      },
      verification:  Verification::registry(
        SourceRegistry::Va,
        attributes.updated_at.clone(),
      ),
      metadata:      json!({
        "facility_type": attributes.facility_type,
        "classification": attributes.classification,
        "visn": attributes.visn,
        "operating_status": {
          "status": attributes.operating_status.code.as_deref().unwrap_or("NORMAL"),
          "notice": attributes.operating_status.additional_info,
          "last_updated": attributes.updated_at,
        },
      }),
      distance_km:   None,
    })
  }

  async fn fetch_by_state<'a>(
    &'a self,
    state: &'a StateCode,
    type_filters: &'a [String],
  ) -> Vec<Facility> {
    let facility_type = type_filters
      .first()
      .map(String::as_str)
      .unwrap_or(DEFAULT_FACILITY_TYPE);
    self.fetch_by_state_typed(state, facility_type).await
  }

  async fn fetch_details<'a>(&'a self, id: &'a str) -> Option<Facility> {
    let facility_id = Self::native_id(id);
    let url = format!("{}{FACILITIES_PATH}/{facility_id}", self.base_url);

    match self.http.get_json(&url, &[]).await {
      Ok(payload) => {
        let raw: VaRecord =
          serde_json::from_value(payload.get("data")?.clone()).ok()?;
        Self::transform(&raw)
      }
      Err(e) => {
        tracing::warn!(id, error = %e, "VA details fetch failed");
        None
      }
    }
  }

  async fn search_nearby<'a>(&'a self, query: &'a NearbyQuery) -> Vec<Facility> {
    let facility_type = query
      .type_filters
      .first()
      .map(String::as_str)
      .unwrap_or(DEFAULT_FACILITY_TYPE);
    self
      .nearby(query.origin, query.radius_km, facility_type, query.limit)
      .await
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn record() -> VaRecord {
    VaRecord {
      id:         Some(json!("998")),
      attributes: VaAttributes {
        name: Some("Boston VA Medical Center".to_string()),
        lat: Some(json!(42.33)),
        long: Some(json!(-71.15)),
        facility_type: "VA Medical Center".to_string(),
        classification: "VAMC".to_string(),
        visn: "VISN 1".to_string(),
        updated_at: "2024-01-15".to_string(),
        ..VaAttributes::default()
      },
    }
  }

  #[test]
  fn transform_builds_prefixed_id() {
    let f = VaFacilities::transform(&record()).unwrap();
    assert_eq!(f.id, "va_998");
    assert_eq!(f.category, Category::VaFacility);
    assert_eq!(f.subcategory, "va_medical_center");
  }

  #[test]
  fn transform_rejects_missing_coordinates() {
    let mut raw = record();
    raw.attributes.lat = None;
    assert!(VaFacilities::transform(&raw).is_none());
  }

  #[test]
  fn subcategory_mapping_table() {
    let cases = [
      ("VA Medical Center", "", "va_medical_center"),
      ("Outpatient Clinic", "", "va_outpatient_clinic"),
      ("Community Clinic", "", "va_outpatient_clinic"),
      ("Vet Center", "", "va_vet_center"),
      ("Regional Office", "", "va_regional_office"),
      ("National Cemetery", "", "va_cemetery"),
      ("Other", "VAMC", "va_medical_center"),
      ("Other", "", "va_facility"),
    ];
    for (facility_type, classification, expected) in cases {
      let mut raw = record();
      raw.attributes.facility_type = facility_type.to_string();
      raw.attributes.classification = classification.to_string();
      let f = VaFacilities::transform(&raw).unwrap();
      assert_eq!(f.subcategory, expected, "for {facility_type:?}/{classification:?}");
    }
  }

  #[test]
  fn medical_center_services_extend_base_list() {
    let f = VaFacilities::transform(&record()).unwrap();
    assert!(f.services.iter().any(|s| s == "Inpatient Care"));
    assert!(f.services.iter().any(|s| s == "Primary Care"));
    assert_eq!(
      f.services.len(),
      BASE_SERVICES.len() + MEDICAL_CENTER_SERVICES.len()
    );
  }

  #[test]
  fn vet_center_services() {
    let mut raw = record();
    raw.attributes.facility_type = "Vet Center".to_string();
    raw.attributes.classification = String::new();
    let f = VaFacilities::transform(&raw).unwrap();
    assert!(f.services.iter().any(|s| s == "PTSD Counseling"));
    assert!(!f.services.iter().any(|s| s == "Inpatient Care"));
  }

  #[test]
  fn va_facilities_are_always_wheelchair_accessible() {
    let f = VaFacilities::transform(&record()).unwrap();
    assert!(f.accessibility.wheelchair_accessible);
    assert!(!f.accessibility.public_transit);
  }

  #[test]
  fn hours_fall_back_to_va_defaults() {
    let mut raw = record();
    raw.attributes.hours.monday = Some("24 hours".to_string());
    let f = VaFacilities::transform(&raw).unwrap();
    assert_eq!(f.hours.monday, "24 hours");
    assert_eq!(f.hours.tuesday, "8:00 AM - 4:30 PM");
    assert_eq!(f.hours.sunday, "Closed");
    assert_eq!(
      f.hours.notes,
      "Emergency services available 24/7 at medical centers"
    );
  }

  #[test]
  fn detail_id_forms_are_equivalent() {
    assert_eq!(VaFacilities::native_id("va_12345"), "12345");
    assert_eq!(VaFacilities::native_id("12345"), "12345");
  }

  #[test]
  fn operating_status_defaults_to_normal() {
    let f = VaFacilities::transform(&record()).unwrap();
    assert_eq!(
      f.metadata["operating_status"]["status"],
      json!("NORMAL")
    );
  }
}
