//! Stream configuration: identity, limits, baseline window, rule set.

use chrono::{DateTime, Utc};
use qc_common::{RuleKind, StreamId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default rule set applied when a version omits `rule_set`.
pub const DEFAULT_RULE_SET: [RuleKind; 5] = RuleKind::ALL;

/// One effective-dated version of a stream's configuration.
///
/// Multiple versions may exist per stream; resolution picks the latest
/// version whose `effective_from` is at or before the evaluated timestamp
/// (ties broken by highest `version`), falling back to the earliest version
/// for timestamps preceding all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StreamConfig {
    pub stream_id: StreamId,

    #[serde(default = "default_version")]
    pub version: u32,

    pub effective_from: DateTime<Utc>,

    #[serde(default = "default_created_by")]
    pub created_by: String,

    pub analyte: String,
    pub method: String,
    pub instrument: String,

    #[serde(default)]
    pub site: Option<String>,

    #[serde(default)]
    pub matrix: Option<String>,

    pub qc_level: String,
    pub control_material_lot: String,
    pub units: String,

    pub target_value: f64,
    pub sigma: f64,

    #[serde(default = "default_action_limit_sd")]
    pub action_limit_sd: f64,

    #[serde(default = "default_warning_limit_sd")]
    pub warning_limit_sd: f64,

    #[serde(default)]
    pub min_value: Option<f64>,

    #[serde(default)]
    pub max_value: Option<f64>,

    /// Multiplicative factors converting from a foreign unit to `units`.
    #[serde(default)]
    pub unit_conversions: Option<BTreeMap<String, f64>>,

    /// Fixed historical window overriding (target_value, sigma) when at
    /// least two records fall inside it.
    #[serde(default)]
    pub baseline_start: Option<DateTime<Utc>>,

    #[serde(default)]
    pub baseline_end: Option<DateTime<Utc>>,

    #[serde(default = "default_risk_threshold_warn")]
    pub risk_threshold_warn: u8,

    #[serde(default = "default_risk_threshold_hold")]
    pub risk_threshold_hold: u8,

    /// Enabled rules; evaluation order is fixed regardless of listing order.
    #[serde(default = "default_rule_set")]
    pub rule_set: Vec<RuleKind>,
}

fn default_version() -> u32 {
    1
}

fn default_created_by() -> String {
    "system".to_string()
}

fn default_action_limit_sd() -> f64 {
    3.0
}

fn default_warning_limit_sd() -> f64 {
    2.0
}

fn default_risk_threshold_warn() -> u8 {
    50
}

fn default_risk_threshold_hold() -> u8 {
    80
}

fn default_rule_set() -> Vec<RuleKind> {
    DEFAULT_RULE_SET.to_vec()
}

impl StreamConfig {
    /// Whether a rule is enabled in this version.
    pub fn rule_enabled(&self, rule: RuleKind) -> bool {
        self.rule_set.contains(&rule)
    }

    /// Lower and upper action limits in measurement units.
    pub fn action_limits(&self) -> (f64, f64) {
        (
            self.target_value - self.action_limit_sd * self.sigma,
            self.target_value + self.action_limit_sd * self.sigma,
        )
    }

    /// Convert a value reported in `from_units` to the stream's canonical
    /// units, if a conversion factor is configured. Identity when units
    /// already match.
    pub fn convert_units(&self, value: f64, from_units: &str) -> Option<f64> {
        if from_units == self.units {
            return Some(value);
        }
        let factor = self.unit_conversions.as_ref()?.get(from_units)?;
        Some(value * factor)
    }
}
