//! Engine configuration: compiled-in defaults plus persisted overrides.
//!
//! # Design
//!
//! Every tunable the engine consults lives here as a named field with a
//! documented unit, instead of as a literal buried in the arithmetic.  The
//! merged value is built once at the start of a processing pass and passed
//! by reference into the pure calculators — it is never mutated mid-pass.
//!
//! Overrides come from the configuration store as typed key/value rows
//! (category `loom_logic`).  An unknown key or a type mismatch is logged and
//! skipped; a bad override must never abort a processing pass.

use tracing::warn;

use crate::error::{CoreError, CoreResult};

// ── ConfigValue ──────────────────────────────────────────────────────────────

/// One typed override value as stored in the configuration store.
///
/// The store tags each row with a primitive type (`number`, `boolean`,
/// `json`); anything else is carried as raw text.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Number(f64),
    Bool(bool),
    Json(serde_json::Value),
    Text(String),
}

impl ConfigValue {
    /// Parse a raw stored string according to its type tag.
    ///
    /// Unrecognised tags fall back to `Text` rather than failing — the store
    /// may grow tags this build does not know about.
    pub fn parse(type_tag: &str, raw: &str) -> CoreResult<ConfigValue> {
        match type_tag {
            "number" => raw
                .trim()
                .parse()
                .map(ConfigValue::Number)
                .map_err(|_| CoreError::Parse(format!("bad number override {raw:?}"))),
            "boolean" => match raw.trim() {
                "true" | "1" => Ok(ConfigValue::Bool(true)),
                "false" | "0" => Ok(ConfigValue::Bool(false)),
                _ => Err(CoreError::Parse(format!("bad boolean override {raw:?}"))),
            },
            "json" => serde_json::from_str(raw)
                .map(ConfigValue::Json)
                .map_err(|e| CoreError::Parse(format!("bad json override: {e}"))),
            _ => Ok(ConfigValue::Text(raw.to_owned())),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

// ── EngineConfig ─────────────────────────────────────────────────────────────

/// Merged engine configuration for one processing pass.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// A lead role is required once participant count strictly exceeds this.
    pub participants_per_lead: u32,
    /// Units of supervision load one support staff member covers.
    pub participants_per_support: f64,
    /// Supervision multiplier at or above which a participant counts as
    /// high-support.
    pub high_support_threshold: f64,
    /// Floor (and missing-value default) for supervision multipliers.
    pub min_supervision_multiplier: f64,
    /// Minimum qualification level preferred for the lead role.
    pub lead_level_threshold: u8,
    /// Fraction of a vehicle's seats usable for transport assignment.
    pub vehicle_capacity_buffer: f64,
    /// Minutes budgeted per pickup/dropoff stop.
    pub pickup_minutes_per_stop: u32,
    /// Floor on a pickup card's duration, minutes.
    pub min_pickup_duration: u32,
    /// Floor on a dropoff card's duration, minutes.
    pub min_dropoff_duration: u32,
    /// Gap between pickup-window end and occurrence start, minutes.
    pub activity_padding_before: u32,
    /// Gap between occurrence end and dropoff-window start, minutes.
    pub activity_padding_after: u32,
    /// Administrative overhead as a fraction of revenue.
    pub admin_cost_percentage: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            participants_per_lead: 5,
            participants_per_support: 5.0,
            high_support_threshold: 2.5,
            min_supervision_multiplier: 1.0,
            lead_level_threshold: 3,
            vehicle_capacity_buffer: 0.8,
            pickup_minutes_per_stop: 10,
            min_pickup_duration: 30,
            min_dropoff_duration: 30,
            activity_padding_before: 15,
            activity_padding_after: 15,
            admin_cost_percentage: 0.18,
        }
    }
}

impl EngineConfig {
    /// Build a config from the defaults plus a set of persisted overrides.
    pub fn with_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, ConfigValue)>,
    {
        let mut config = Self::default();
        for (key, value) in overrides {
            config.apply_override(&key, &value);
        }
        config
    }

    /// Apply one override; unknown keys and type mismatches are logged and
    /// ignored.
    pub fn apply_override(&mut self, key: &str, value: &ConfigValue) {
        let Some(n) = value.as_number() else {
            warn!(key, ?value, "non-numeric value for numeric config key, ignored");
            return;
        };
        match key {
            "participants_per_lead" => self.participants_per_lead = n.max(0.0) as u32,
            "participants_per_support" => self.participants_per_support = n,
            "high_support_threshold" => self.high_support_threshold = n,
            "min_supervision_multiplier" => self.min_supervision_multiplier = n,
            "lead_level_threshold" => self.lead_level_threshold = n.max(0.0) as u8,
            "vehicle_capacity_buffer" => self.vehicle_capacity_buffer = n,
            "pickup_minutes_per_stop" => self.pickup_minutes_per_stop = n.max(0.0) as u32,
            "min_pickup_duration" => self.min_pickup_duration = n.max(0.0) as u32,
            "min_dropoff_duration" => self.min_dropoff_duration = n.max(0.0) as u32,
            "activity_padding_before" => self.activity_padding_before = n.max(0.0) as u32,
            "activity_padding_after" => self.activity_padding_after = n.max(0.0) as u32,
            "admin_cost_percentage" => self.admin_cost_percentage = n,
            _ => warn!(key, "unknown config override key, ignored"),
        }
    }
}
