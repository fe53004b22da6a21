//! HRSA health-center registry adapter.
//!
//! Fronts the Health Resources & Services Administration site registry.
//! Canonical ids are `hrsa_{site_id}`.

use serde::Deserialize;
use serde_json::json;
use waypost_core::{
  facility::{
    Accessibility, Address, Category, Contact, Coordinates, Facility,
    SourceRegistry, Verification,
  },
  provider::{FacilityProvider, NearbyQuery, StateCode},
};

use crate::{
  ProviderConfig, Result,
  http::UpstreamClient,
  raw::{RawHours, coerce_f64, coerce_id, name_or},
};

pub const ID_PREFIX: &str = "hrsa_";

const STATE_PATH: &str = "/api/HealthCenters/GetHealthCentersByState";
const DETAILS_PATH: &str = "/api/HealthCenters/GetHealthCenterDetails";

const WEEKDAY_HOURS: &str = "8:00 AM - 5:00 PM";
const HOURS_NOTES: &str = "Hours may vary, please call ahead";

/// Provider classification keyword → subcategory. First match wins; sites
/// with no recognised keyword are plain FQHCs.
const TYPE_KEYWORDS: &[(&str, &str)] = &[
  ("community", "community_health_center"),
  ("migrant", "migrant_health_center"),
  ("homeless", "homeless_health_center"),
  ("housing", "public_housing_health_center"),
  ("school", "school_based_health_center"),
];

// ─── Raw record ──────────────────────────────────────────────────────────────

/// One site record as the HRSA API ships it. Coordinates and the site id
/// arrive as numbers or strings depending on the export path, so both are
/// kept as raw JSON values and coerced at transform time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HrsaSite {
  #[serde(default)]
  pub site_id:            Option<serde_json::Value>,
  #[serde(default)]
  pub site_name:          Option<String>,
  #[serde(default)]
  pub health_center_type: String,
  #[serde(default)]
  pub latitude:           Option<serde_json::Value>,
  #[serde(default)]
  pub longitude:          Option<serde_json::Value>,

  #[serde(default)]
  pub site_address:       String,
  #[serde(default)]
  pub site_city:          String,
  #[serde(default)]
  pub site_state_name:    String,
  #[serde(default)]
  pub site_postal_code:   String,
  #[serde(default)]
  pub county_name:        String,

  #[serde(default)]
  pub site_phone:         String,
  #[serde(default)]
  pub site_web_address:   String,
  #[serde(default)]
  pub contact_email:      String,

  // Service indicator flags.
  #[serde(default)]
  pub primary_care:       bool,
  #[serde(default)]
  pub dental_care:        bool,
  #[serde(default)]
  pub mental_health:      bool,
  #[serde(default)]
  pub substance_abuse:    bool,
  #[serde(default)]
  pub pharmacy:           bool,
  #[serde(default)]
  pub vision_care:        bool,
  #[serde(default)]
  pub case_management:    bool,
  #[serde(default)]
  pub transportation:     bool,
  #[serde(default)]
  pub health_education:   bool,
  #[serde(default)]
  pub interpretation:     bool,

  #[serde(default)]
  pub hours_monday:       Option<String>,
  #[serde(default)]
  pub hours_tuesday:      Option<String>,
  #[serde(default)]
  pub hours_wednesday:    Option<String>,
  #[serde(default)]
  pub hours_thursday:     Option<String>,
  #[serde(default)]
  pub hours_friday:       Option<String>,
  #[serde(default)]
  pub hours_saturday:     Option<String>,
  #[serde(default)]
  pub hours_sunday:       Option<String>,
  #[serde(default)]
  pub hours_notes:        Option<String>,

  #[serde(default)]
  pub ada_accessible:     bool,
  #[serde(default)]
  pub public_transportation: bool,

  #[serde(default)]
  pub last_updated_date:  String,
  #[serde(default)]
  pub grantee_name:       String,
  #[serde(default)]
  pub grant_number:       String,
  #[serde(default)]
  pub service_area_name:  String,
}

// ─── Adapter ─────────────────────────────────────────────────────────────────

/// Adapter for the HRSA health-center registry.
#[derive(Debug, Clone)]
pub struct HrsaDirectory {
  http:     UpstreamClient,
  base_url: String,
}

impl HrsaDirectory {
  pub fn new(config: &ProviderConfig) -> Result<Self> {
    Ok(Self {
      http:     UpstreamClient::new()?,
      base_url: config.hrsa_base_url.trim_end_matches('/').to_string(),
    })
  }

  fn subcategory(raw: &HrsaSite) -> &'static str {
    let center_type = raw.health_center_type.to_lowercase();
    TYPE_KEYWORDS
      .iter()
      .find(|(keyword, _)| center_type.contains(keyword))
      .map(|(_, subcategory)| *subcategory)
      .unwrap_or("federally_qualified_health_center")
  }

  /// Map the boolean indicator flags to display names, in table order.
  fn services(raw: &HrsaSite) -> Vec<String> {
    let indicators = [
      (raw.primary_care, "Primary Care"),
      (raw.dental_care, "Dental Care"),
      (raw.mental_health, "Mental Health Services"),
      (raw.substance_abuse, "Substance Abuse Treatment"),
      (raw.pharmacy, "Pharmacy Services"),
      (raw.vision_care, "Vision Care"),
      (raw.case_management, "Case Management"),
      (raw.transportation, "Transportation Services"),
      (raw.health_education, "Health Education"),
      (raw.interpretation, "Translation Services"),
    ];
    indicators
      .iter()
      .filter(|(flag, _)| *flag)
      .map(|(_, name)| (*name).to_string())
      .collect()
  }

  fn hours(raw: &HrsaSite) -> RawHours {
    RawHours {
      monday:    raw.hours_monday.clone(),
      tuesday:   raw.hours_tuesday.clone(),
      wednesday: raw.hours_wednesday.clone(),
      thursday:  raw.hours_thursday.clone(),
      friday:    raw.hours_friday.clone(),
      saturday:  raw.hours_saturday.clone(),
      sunday:    raw.hours_sunday.clone(),
      notes:     raw.hours_notes.clone(),
    }
  }

  /// Detail lookups accept either form; strip the prefix when present.
  fn native_id(id: &str) -> &str {
    id.strip_prefix(ID_PREFIX).unwrap_or(id)
  }

  /// Deserialize each element of the response's `data` array independently,
  /// so one structurally invalid record never poisons its siblings.
  fn sites_from_payload(payload: &serde_json::Value) -> Vec<HrsaSite> {
    let Some(records) = payload.get("data").and_then(|d| d.as_array()) else {
      tracing::warn!("HRSA payload missing 'data' array");
      return Vec::new();
    };
    records
      .iter()
      .filter_map(|record| match serde_json::from_value(record.clone()) {
        Ok(site) => Some(site),
        Err(e) => {
          tracing::warn!(error = %e, "skipping malformed HRSA record");
          None
        }
      })
      .collect()
  }
}

impl FacilityProvider for HrsaDirectory {
  type Raw = HrsaSite;

  fn registry(&self) -> SourceRegistry {
    SourceRegistry::Hrsa
  }

  fn category(&self) -> Category {
    Category::HealthCenter
  }

  fn transform(raw: &HrsaSite) -> Option<Facility> {
    let Some(site_id) = coerce_id(raw.site_id.as_ref()) else {
      tracing::warn!("HRSA record missing site_id; skipping");
      return None;
    };

    let latitude = coerce_f64(raw.latitude.as_ref());
    let longitude = coerce_f64(raw.longitude.as_ref());
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
      tracing::warn!(site_id, "HRSA record missing numeric coordinates; skipping");
      return None;
    };

    Some(Facility {
      id:            format!("{ID_PREFIX}{site_id}"),
      name:          name_or("Health Center", raw.site_name.as_ref()),
      category:      Category::HealthCenter,
      subcategory:   Self::subcategory(raw).to_string(),
      coordinates:   Coordinates::new(latitude, longitude),
      address:       Address {
        street:   raw.site_address.clone(),
        city:     raw.site_city.clone(),
        state:    raw.site_state_name.clone(),
        zip_code: raw.site_postal_code.clone(),
        county:   raw.county_name.clone(),
      },
      contact:       Contact {
        phone:   raw.site_phone.clone(),
        website: raw.site_web_address.clone(),
        email:   raw.contact_email.clone(),
      },
      services:      Self::services(raw),
      hours:         Self::hours(raw).resolve(WEEKDAY_HOURS, HOURS_NOTES),
      accessibility: Accessibility {
        wheelchair_accessible: raw.ada_accessible,
        public_transit:        raw.public_transportation,
      },
      verification:  Verification::registry(
        SourceRegistry::Hrsa,
        raw.last_updated_date.clone(),
      ),
      metadata:      json!({
        "fqhc_status": raw.health_center_type,
        "grantee_name": raw.grantee_name,
        "grant_number": raw.grant_number,
        "service_area": raw.service_area_name,
      }),
      distance_km:   None,
    })
  }

  // The registry has no fine-grained types; filters are ignored.
  async fn fetch_by_state<'a>(
    &'a self,
    state: &'a StateCode,
    _type_filters: &'a [String],
  ) -> Vec<Facility> {
    let url = format!("{}{STATE_PATH}", self.base_url);
    let params = [
      ("state", state.as_str().to_string()),
      ("format", "json".to_string()),
    ];

    match self.http.get_json(&url, &params).await {
      Ok(payload) => {
        let facilities: Vec<Facility> = Self::sites_from_payload(&payload)
          .iter()
          .filter_map(Self::transform)
          .collect();
        tracing::info!(
          state = %state,
          count = facilities.len(),
          "fetched HRSA health centers"
        );
        facilities
      }
      Err(e) => {
        tracing::warn!(
          state = %state,
          error = %e,
          "HRSA fetch failed; returning empty result set"
        );
        Vec::new()
      }
    }
  }

  async fn fetch_details<'a>(&'a self, id: &'a str) -> Option<Facility> {
    let site_id = Self::native_id(id);
    let url = format!("{}{DETAILS_PATH}", self.base_url);
    let params = [("site_id", site_id.to_string())];

    match self.http.get_json(&url, &params).await {
      Ok(payload) => {
        let raw: HrsaSite =
          serde_json::from_value(payload.get("data")?.clone()).ok()?;
        Self::transform(&raw)
      }
      Err(e) => {
        tracing::warn!(id, error = %e, "HRSA details fetch failed");
        None
      }
    }
  }

  async fn search_nearby<'a>(&'a self, _query: &'a NearbyQuery) -> Vec<Facility> {
    // The registry has no live proximity endpoint; fail closed rather than
    // serve synthetic data. A cached, spatially indexed copy is the planned
    // collaborator for this path.
    tracing::warn!("HRSA proximity search has no live endpoint; returning empty result set");
    Vec::new()
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
