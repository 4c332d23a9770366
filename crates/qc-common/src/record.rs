//! QC measurement records.
//!
//! A [`QcRecord`] is one accepted measurement for a stream. Records are
//! immutable once persisted except for `include_in_stats`, which an
//! investigation may clear to exclude a record from baseline and posterior
//! calculations without deleting it.

use crate::id::StreamId;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How a record entered the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    #[default]
    Automated,
    Manual,
}

/// Duplicate classification assigned at ingest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStatus {
    /// No prior record shares this (stream, timestamp) pair.
    #[default]
    Unique,
    /// Same stream and timestamp, different value.
    PossibleDuplicate,
    /// Same stream, timestamp, and value.
    Duplicate,
}

/// One accepted QC measurement, normalized to the stream's canonical units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QcRecord {
    pub stream_id: StreamId,
    pub timestamp: DateTime<Utc>,
    pub result_value: f64,
    pub analyte: String,
    pub qc_level: String,
    pub instrument_id: String,
    pub method_id: String,

    #[serde(default)]
    pub operator_id: Option<String>,

    #[serde(default)]
    pub reagent_lot: Option<String>,

    pub control_material_lot: String,

    #[serde(default)]
    pub calibration_status: Option<String>,

    #[serde(default)]
    pub run_id: Option<String>,

    pub units: String,

    #[serde(default)]
    pub flags: Vec<String>,

    #[serde(default)]
    pub entry_source: EntrySource,

    #[serde(default)]
    pub comments: Option<String>,

    #[serde(default)]
    pub duplicate_status: DuplicateStatus,

    /// Cleared when an investigation invalidates the record.
    #[serde(default = "default_include_in_stats")]
    pub include_in_stats: bool,
}

fn default_include_in_stats() -> bool {
    true
}

impl QcRecord {
    /// Minimal record constructor for a stream, used by tests and replays.
    /// Metadata fields default to empty/automated.
    pub fn measurement(
        stream_id: impl Into<StreamId>,
        timestamp: DateTime<Utc>,
        result_value: f64,
    ) -> Self {
        QcRecord {
            stream_id: stream_id.into(),
            timestamp,
            result_value,
            analyte: String::new(),
            qc_level: String::new(),
            instrument_id: String::new(),
            method_id: String::new(),
            operator_id: None,
            reagent_lot: None,
            control_material_lot: String::new(),
            calibration_status: None,
            run_id: None,
            units: String::new(),
            flags: Vec::new(),
            entry_source: EntrySource::Automated,
            comments: None,
            duplicate_status: DuplicateStatus::Unique,
            include_in_stats: true,
        }
    }

    /// Whether the result value is a usable finite number.
    pub fn has_finite_value(&self) -> bool {
        self.result_value.is_finite()
    }
}
