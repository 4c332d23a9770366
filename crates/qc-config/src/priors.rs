//! Bayesian prior configuration.
//!
//! One effective-dated version of the Normal-Inverse-Gamma hyperparameters
//! for a stream: the distribution over (mean, variance) before any
//! stream-specific observations are folded in.

use chrono::{DateTime, Utc};
use qc_common::StreamId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// NIG hyperparameters for a stream, effective-dated like [`crate::StreamConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PriorConfig {
    pub stream_id: StreamId,

    #[serde(default = "default_version")]
    pub version: u32,

    pub effective_from: DateTime<Utc>,

    #[serde(default = "default_created_by")]
    pub created_by: String,

    /// Prior mean.
    pub mu0: f64,
    /// Prior pseudo-count on the mean.
    pub kappa0: f64,
    /// Inverse-Gamma shape on the variance.
    pub alpha0: f64,
    /// Inverse-Gamma scale on the variance.
    pub beta0: f64,
}

fn default_version() -> u32 {
    1
}

fn default_created_by() -> String {
    "system".to_string()
}
