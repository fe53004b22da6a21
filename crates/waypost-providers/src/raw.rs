//! Lenient helpers shared by the raw provider record types.
//!
//! The registries disagree on field typing — coordinates arrive as JSON
//! numbers from one provider and as numeric strings from another, native ids
//! as integers or strings. The coercions here accept both; anything else is a
//! per-record transform rejection.

use serde::Deserialize;
use serde_json::Value;

/// Coerce a JSON number or numeric string to `f64`.
pub(crate) fn coerce_f64(value: Option<&Value>) -> Option<f64> {
  match value? {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

/// Coerce a provider-native identifier (string or integer) to a non-empty
/// string. Empty ids are structurally invalid.
pub(crate) fn coerce_id(value: Option<&Value>) -> Option<String> {
  let id = match value? {
    Value::String(s) => s.trim().to_string(),
    Value::Number(n) => n.to_string(),
    _ => return None,
  };
  (!id.is_empty()).then_some(id)
}

/// Non-empty provider string, or the per-category fallback label.
pub(crate) fn name_or(label: &str, name: Option<&String>) -> String {
  match name {
    Some(n) if !n.trim().is_empty() => n.clone(),
    _ => label.to_string(),
  }
}

/// Nested weekly-hours block, as the VA API ships it and as the flat
/// `hours_*` provider fields are collected into.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHours {
  #[serde(default)]
  pub monday:    Option<String>,
  #[serde(default)]
  pub tuesday:   Option<String>,
  #[serde(default)]
  pub wednesday: Option<String>,
  #[serde(default)]
  pub thursday:  Option<String>,
  #[serde(default)]
  pub friday:    Option<String>,
  #[serde(default)]
  pub saturday:  Option<String>,
  #[serde(default)]
  pub sunday:    Option<String>,
  #[serde(default)]
  pub notes:     Option<String>,
}

impl RawHours {
  /// Resolve against per-source defaults: provider value wins, weekdays fall
  /// back to `weekday`, weekends to "Closed", notes to `notes`.
  pub(crate) fn resolve(
    &self,
    weekday: &str,
    notes: &str,
  ) -> waypost_core::facility::Hours {
    let d = |v: &Option<String>, default: &str| {
      v.clone().unwrap_or_else(|| default.to_string())
    };
    waypost_core::facility::Hours {
      monday:    d(&self.monday, weekday),
      tuesday:   d(&self.tuesday, weekday),
      wednesday: d(&self.wednesday, weekday),
      thursday:  d(&self.thursday, weekday),
      friday:    d(&self.friday, weekday),
      saturday:  d(&self.saturday, "Closed"),
      sunday:    d(&self.sunday, "Closed"),
      notes:     d(&self.notes, notes),
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn coerce_f64_accepts_numbers_and_numeric_strings() {
    assert_eq!(coerce_f64(Some(&json!(40.01))), Some(40.01));
    assert_eq!(coerce_f64(Some(&json!("-75.2"))), Some(-75.2));
    assert_eq!(coerce_f64(Some(&json!("not a number"))), None);
    assert_eq!(coerce_f64(Some(&json!(null))), None);
    assert_eq!(coerce_f64(None), None);
  }

  #[test]
  fn coerce_id_accepts_strings_and_integers() {
    assert_eq!(coerce_id(Some(&json!("12345"))), Some("12345".to_string()));
    assert_eq!(coerce_id(Some(&json!(998))), Some("998".to_string()));
    assert_eq!(coerce_id(Some(&json!(""))), None);
    assert_eq!(coerce_id(None), None);
  }

  #[test]
  fn raw_hours_resolve_prefers_provider_values() {
    let raw = RawHours {
      monday: Some("7:00 AM - 7:00 PM".to_string()),
      ..RawHours::default()
    };
    let hours = raw.resolve("8:00 AM - 5:00 PM", "Call ahead");
    assert_eq!(hours.monday, "7:00 AM - 7:00 PM");
    assert_eq!(hours.tuesday, "8:00 AM - 5:00 PM");
    assert_eq!(hours.saturday, "Closed");
    assert_eq!(hours.notes, "Call ahead");
  }
}
