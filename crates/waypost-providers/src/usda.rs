//! USDA office registry adapter.
//!
//! The USDA has no unified facilities API; each agency exposes (or plans) its
//! own office listing, so this adapter fans a state query out across the
//! per-kind endpoints it knows about. Canonical ids are
//! `usda_{kind}_{office_id}` (e.g. `usda_snap_7`).

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

pub const ID_PREFIX: &str = "usda_";

const WEEKDAY_HOURS: &str = "8:00 AM - 4:30 PM";
const HOURS_NOTES: &str = "Hours may vary, please call ahead";

// ─── Office kinds ────────────────────────────────────────────────────────────

/// The fine-grained USDA office families, each with its own subcategory,
/// agency attribution, service list, and (where one exists) listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsdaOfficeKind {
  RuralDevelopment,
  Snap,
  Fsa,
  Extension,
  Wic,
}

impl UsdaOfficeKind {
  pub const ALL: &[UsdaOfficeKind] = &[
    Self::RuralDevelopment,
    Self::Snap,
    Self::Fsa,
    Self::Extension,
    Self::Wic,
  ];

  /// The default set queried when a caller passes no type filters.
  pub const DEFAULT_SET: &[UsdaOfficeKind] =
    &[Self::RuralDevelopment, Self::Snap, Self::Fsa, Self::Extension];

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "rural_development" => Some(Self::RuralDevelopment),
      "snap" => Some(Self::Snap),
      "fsa" => Some(Self::Fsa),
      "extension" => Some(Self::Extension),
      "wic" => Some(Self::Wic),
      _ => None,
    }
  }

  pub fn key(&self) -> &'static str {
    match self {
      Self::RuralDevelopment => "rural_development",
      Self::Snap => "snap",
      Self::Fsa => "fsa",
      Self::Extension => "extension",
      Self::Wic => "wic",
    }
  }

  pub fn subcategory(&self) -> &'static str {
    match self {
      Self::RuralDevelopment => "usda_rural_development_office",
      Self::Snap => "usda_snap_office",
      Self::Fsa => "usda_farm_service_center",
      Self::Extension => "usda_extension_office",
      Self::Wic => "usda_wic_office",
    }
  }

  pub fn agency(&self) -> &'static str {
    match self {
      Self::RuralDevelopment => "Rural Development (RD)",
      Self::Snap => "Food and Nutrition Service (FNS)",
      Self::Fsa => "Farm Service Agency (FSA)",
      Self::Extension => "National Institute of Food and Agriculture (NIFA)",
      Self::Wic => "Food and Nutrition Service (FNS)",
    }
  }

  pub fn services(&self) -> &'static [&'static str] {
    match self {
      Self::RuralDevelopment => &[
        "Rural Housing Loans",
        "Business & Industry Loans",
        "Community Facilities Direct Loans",
        "Water & Waste Disposal Loans",
        "Rural Energy Programs",
        "Broadband Access Programs",
      ],
      Self::Snap => &[
        "SNAP Application Assistance",
        "Food Assistance Program Information",
        "Nutrition Education",
        "Benefits Card Replacement",
        "Eligibility Screening",
      ],
      Self::Fsa => &[
        "Farm Loans",
        "Conservation Programs",
        "Crop Insurance",
        "Disaster Assistance",
        "Marketing Assistance Loans",
        "Commodity Programs",
      ],
      Self::Extension => &[
        "Agricultural Education",
        "4-H Youth Programs",
        "Master Gardener Programs",
        "Family & Consumer Sciences",
        "Community Development",
        "Nutrition Education",
      ],
      Self::Wic => &[
        "WIC Benefits",
        "Nutrition Counseling",
        "Breastfeeding Support",
        "Health Screenings",
        "Referrals to Healthcare",
      ],
    }
  }

  /// The agency listing endpoint, where the agency publishes one. Extension
  /// and WIC offices are listed by state programs, not a federal endpoint.
  fn endpoint_path(&self) -> Option<&'static str> {
    match self {
      Self::RuralDevelopment => Some("/api/rd/offices"),
      Self::Snap => Some("/api/fns/snap-offices"),
      Self::Fsa => Some("/api/fsa/service-centers"),
      Self::Extension | Self::Wic => None,
    }
  }
}

// ─── Raw record ──────────────────────────────────────────────────────────────

/// One office record as an agency listing ships it, tagged with the kind of
/// the endpoint it came from.
#[derive(Debug, Clone)]
pub struct UsdaRecord {
  pub kind:   UsdaOfficeKind,
  pub office: UsdaOffice,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsdaOffice {
  #[serde(default)]
  pub id:                    Option<serde_json::Value>,
  #[serde(default)]
  pub name:                  Option<String>,
  #[serde(default)]
  pub latitude:              Option<serde_json::Value>,
  #[serde(default)]
  pub longitude:             Option<serde_json::Value>,

  #[serde(default)]
  pub address:               String,
  #[serde(default)]
  pub city:                  String,
  #[serde(default)]
  pub state:                 String,
  #[serde(default)]
  pub zip_code:              String,
  #[serde(default)]
  pub county:                String,

  #[serde(default)]
  pub phone:                 String,
  #[serde(default)]
  pub website:               String,
  #[serde(default)]
  pub email:                 String,

  #[serde(default)]
  pub hours_monday:          Option<String>,
  #[serde(default)]
  pub hours_tuesday:         Option<String>,
  #[serde(default)]
  pub hours_wednesday:       Option<String>,
  #[serde(default)]
  pub hours_thursday:        Option<String>,
  #[serde(default)]
  pub hours_friday:          Option<String>,
  #[serde(default)]
  pub hours_saturday:        Option<String>,
  #[serde(default)]
  pub hours_sunday:          Option<String>,
  #[serde(default)]
  pub hours_notes:           Option<String>,

  #[serde(default = "default_true")]
  pub wheelchair_accessible: bool,
  #[serde(default)]
  pub public_transit:        bool,

  #[serde(default)]
  pub last_updated:          String,
  #[serde(default)]
  pub programs:              Vec<String>,
  #[serde(default)]
  pub languages_supported:   Vec<String>,
}

fn default_true() -> bool {
  true
}

// ─── Adapter ─────────────────────────────────────────────────────────────────

/// Adapter for the USDA agency office listings.
#[derive(Debug, Clone)]
pub struct UsdaOffices {
  http:     UpstreamClient,
  base_url: String,
}

impl UsdaOffices {
  pub fn new(config: &ProviderConfig) -> Result<Self> {
    Ok(Self {
      http:     UpstreamClient::new()?,
      base_url: config.usda_base_url.trim_end_matches('/').to_string(),
    })
  }

  /// Resolve requested type filter strings to office kinds; unrecognised
  /// filters are dropped with a warning, and no filters means the default
  /// set.
  pub fn kinds_for_filters(filters: &[String]) -> Vec<UsdaOfficeKind> {
    if filters.is_empty() {
      return UsdaOfficeKind::DEFAULT_SET.to_vec();
    }
    filters
      .iter()
      .filter_map(|f| {
        let kind = UsdaOfficeKind::parse(f);
        if kind.is_none() {
          tracing::warn!(filter = %f, "unknown USDA facility type; ignoring");
        }
        kind
      })
      .collect()
  }

  fn hours(office: &UsdaOffice) -> RawHours {
    RawHours {
      monday:    office.hours_monday.clone(),
      tuesday:   office.hours_tuesday.clone(),
      wednesday: office.hours_wednesday.clone(),
      thursday:  office.hours_thursday.clone(),
      friday:    office.hours_friday.clone(),
      saturday:  office.hours_saturday.clone(),
      sunday:    office.hours_sunday.clone(),
      notes:     office.hours_notes.clone(),
    }
  }

  fn offices_from_payload(
    payload: &serde_json::Value,
    kind: UsdaOfficeKind,
  ) -> Vec<UsdaRecord> {
    let Some(records) = payload.get("data").and_then(|d| d.as_array()) else {
      tracing::warn!(kind = kind.key(), "USDA payload missing 'data' array");
      return Vec::new();
    };
    records
      .iter()
      .filter_map(|record| match serde_json::from_value(record.clone()) {
        Ok(office) => Some(UsdaRecord { kind, office }),
        Err(e) => {
          tracing::warn!(kind = kind.key(), error = %e, "skipping malformed USDA record");
          None
        }
      })
      .collect()
  }

  async fn fetch_kind_by_state(
    &self,
    kind: UsdaOfficeKind,
    state: &StateCode,
  ) -> Vec<Facility> {
    let Some(path) = kind.endpoint_path() else {
      tracing::debug!(kind = kind.key(), "no federal listing endpoint; skipping");
      return Vec::new();
    };
    let url = format!("{}{path}", self.base_url);
    let params = [("state", state.as_str().to_string())];

    match self.http.get_json(&url, &params).await {
      Ok(payload) => Self::offices_from_payload(&payload, kind)
        .iter()
        .filter_map(Self::transform)
        .collect(),
      Err(e) => {
        tracing::warn!(
          kind = kind.key(),
          state = %state,
          error = %e,
          "USDA fetch failed; returning empty result set"
        );
        Vec::new()
      }
    }
  }

  /// State query restricted to the given office kinds.
  pub async fn fetch_by_state_kinds(
    &self,
    state: &StateCode,
    kinds: &[UsdaOfficeKind],
  ) -> Vec<Facility> {
    let mut facilities = Vec::new();
    for kind in kinds {
      facilities.extend(self.fetch_kind_by_state(*kind, state).await);
    }
    tracing::info!(
      state = %state,
      count = facilities.len(),
      "fetched USDA offices"
    );
    facilities
  }

  /// Split a (possibly unprefixed) id into its office kind and native id.
  /// Kind keys can themselves contain underscores, so match them as whole
  /// prefixes rather than splitting.
  fn parse_id(id: &str) -> Option<(UsdaOfficeKind, &str)> {
    let rest = id.strip_prefix(ID_PREFIX).unwrap_or(id);
    for kind in UsdaOfficeKind::ALL {
      if let Some(native) = rest
        .strip_prefix(kind.key())
        .and_then(|r| r.strip_prefix('_'))
      {
        return (!native.is_empty()).then_some((*kind, native));
      }
    }
    None
  }
}

impl FacilityProvider for UsdaOffices {
  type Raw = UsdaRecord;

  fn registry(&self) -> SourceRegistry {
    SourceRegistry::Usda
  }

  fn category(&self) -> Category {
    Category::UsdaFacility
  }

  fn transform(raw: &UsdaRecord) -> Option<Facility> {
    let kind = raw.kind;
    let office = &raw.office;

    let Some(office_id) = coerce_id(office.id.as_ref()) else {
      tracing::warn!(kind = kind.key(), "USDA record missing id; skipping");
      return None;
    };

    let latitude = coerce_f64(office.latitude.as_ref());
    let longitude = coerce_f64(office.longitude.as_ref());
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
      tracing::warn!(
        kind = kind.key(),
        office_id,
        "USDA record missing numeric coordinates; skipping"
      );
      return None;
    };

    let languages = if office.languages_supported.is_empty() {
      vec!["English".to_string()]
    } else {
      office.languages_supported.clone()
    };

    Some(Facility {
      id:            format!("{ID_PREFIX}{}_{office_id}", kind.key()),
      name:          name_or("USDA Facility", office.name.as_ref()),
      category:      Category::UsdaFacility,
      subcategory:   kind.subcategory().to_string(),
      coordinates:   Coordinates::new(latitude, longitude),
      address:       Address {
        street:   office.address.clone(),
        city:     office.city.clone(),
        state:    office.state.clone(),
        zip_code: office.zip_code.clone(),
        county:   office.county.clone(),
      },
      contact:       Contact {
        phone:   office.phone.clone(),
        website: office.website.clone(),
        email:   office.email.clone(),
      },
      services:      kind.services().iter().map(|s| (*s).to_string()).collect(),
      hours:         Self::hours(office).resolve(WEEKDAY_HOURS, HOURS_NOTES),
      accessibility: Accessibility {
        wheelchair_accessible: office.wheelchair_accessible,
        public_transit:        office.public_transit,
      },
      verification:  Verification::registry(
        SourceRegistry::Usda,
        office.last_updated.clone(),
      ),
      metadata:      json!({
        "facility_type": kind.key(),
        "agency": kind.agency(),
        "programs": office.programs,
        "languages": languages,
      }),
      distance_km:   None,
    })
  }

  async fn fetch_by_state<'a>(
    &'a self,
    state: &'a StateCode,
    type_filters: &'a [String],
  ) -> Vec<Facility> {
    let kinds = Self::kinds_for_filters(type_filters);
    self.fetch_by_state_kinds(state, &kinds).await
  }

  async fn fetch_details<'a>(&'a self, id: &'a str) -> Option<Facility> {
    let Some((kind, native)) = Self::parse_id(id) else {
      tracing::warn!(id, "unparseable USDA facility id");
      return None;
    };
    let path = kind.endpoint_path()?;
    let url = format!("{}{path}/{native}", self.base_url);

    match self.http.get_json(&url, &[]).await {
      Ok(payload) => {
        let office: UsdaOffice =
          serde_json::from_value(payload.get("data")?.clone()).ok()?;
        Self::transform(&UsdaRecord { kind, office })
      }
      Err(e) => {
        tracing::warn!(id, error = %e, "USDA details fetch failed");
        None
      }
    }
  }

  async fn search_nearby<'a>(&'a self, _query: &'a NearbyQuery) -> Vec<Facility> {
    // No agency publishes a proximity endpoint; fail closed rather than
    // serve synthetic data.
    tracing::warn!("USDA proximity search has no live endpoint; returning empty result set");
    Vec::new()
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn record(kind: UsdaOfficeKind) -> UsdaRecord {
    UsdaRecord {
      kind,
      office: UsdaOffice {
        id: Some(json!(7)),
        name: Some("County Service Office".to_string()),
        latitude: Some(json!(38.9)),
        longitude: Some(json!(-77.03)),
        last_updated: "2024-01-12".to_string(),
        ..UsdaOffice::default()
      },
    }
  }

  #[test]
  fn transform_builds_kind_prefixed_id() {
    let f = UsdaOffices::transform(&record(UsdaOfficeKind::Snap)).unwrap();
    assert_eq!(f.id, "usda_snap_7");
    assert_eq!(f.subcategory, "usda_snap_office");
    assert_eq!(f.category, Category::UsdaFacility);
  }

  #[test]
  fn transform_rejects_missing_coordinates() {
    let mut raw = record(UsdaOfficeKind::Fsa);
    raw.office.longitude = Some(json!({}));
    assert!(UsdaOffices::transform(&raw).is_none());
  }

  #[test]
  fn services_and_agency_follow_kind_tables() {
    let f = UsdaOffices::transform(&record(UsdaOfficeKind::Fsa)).unwrap();
    assert_eq!(f.subcategory, "usda_farm_service_center");
    assert!(f.services.iter().any(|s| s == "Farm Loans"));
    assert_eq!(f.metadata["agency"], json!("Farm Service Agency (FSA)"));
  }

  #[test]
  fn languages_default_to_english() {
    let f = UsdaOffices::transform(&record(UsdaOfficeKind::Snap)).unwrap();
    assert_eq!(f.metadata["languages"], json!(["English"]));

    let mut raw = record(UsdaOfficeKind::Snap);
    raw.office.languages_supported = vec!["English".to_string(), "Spanish".to_string()];
    let f = UsdaOffices::transform(&raw).unwrap();
    assert_eq!(f.metadata["languages"], json!(["English", "Spanish"]));
  }

  #[test]
  fn wheelchair_accessibility_defaults_to_true_on_deserialize() {
    let office: UsdaOffice = serde_json::from_value(json!({
      "id": 3,
      "latitude": 38.9,
      "longitude": -77.03,
    }))
    .unwrap();
    let raw = UsdaRecord {
      kind: UsdaOfficeKind::RuralDevelopment,
      office,
    };
    let f = UsdaOffices::transform(&raw).unwrap();
    assert!(f.accessibility.wheelchair_accessible);
    assert!(!f.accessibility.public_transit);
  }

  #[test]
  fn parse_id_handles_prefixed_and_bare_forms() {
    assert_eq!(
      UsdaOffices::parse_id("usda_snap_7"),
      Some((UsdaOfficeKind::Snap, "7"))
    );
    assert_eq!(
      UsdaOffices::parse_id("snap_7"),
      Some((UsdaOfficeKind::Snap, "7"))
    );
    assert_eq!(
      UsdaOffices::parse_id("usda_rural_development_12"),
      Some((UsdaOfficeKind::RuralDevelopment, "12"))
    );
    assert_eq!(UsdaOffices::parse_id("usda_bogus_7"), None);
    assert_eq!(UsdaOffices::parse_id("usda_snap_"), None);
  }

  #[test]
  fn kinds_for_filters_defaults_and_parses() {
    assert_eq!(
      UsdaOffices::kinds_for_filters(&[]),
      UsdaOfficeKind::DEFAULT_SET.to_vec()
    );
    let kinds = UsdaOffices::kinds_for_filters(&[
      "snap".to_string(),
      "unknown".to_string(),
      "wic".to_string(),
    ]);
    assert_eq!(kinds, vec![UsdaOfficeKind::Snap, UsdaOfficeKind::Wic]);
  }
}
