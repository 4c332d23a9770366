//! Rule signals, Bayesian risk, dispositions, and alerts.
//!
//! These are the outputs of the two decision engines and the disposition
//! policy that combines them.

use crate::id::{AlertId, StreamId};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a frequentist rule signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warn,
    Action,
}

/// Closed set of supported control rules.
///
/// A stream's config enables a subset of these; evaluation always walks them
/// in this declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum RuleKind {
    /// Single observation beyond the action limit.
    #[serde(rename = "1-3s")]
    OneThreeS,
    /// Two consecutive observations beyond the warning limit, same side.
    #[serde(rename = "2-2s")]
    TwoTwoS,
    /// Consecutive observations beyond the warning limit on opposite sides.
    #[serde(rename = "R-4s")]
    RFourS,
    /// Four consecutive observations beyond 1 SD, same side.
    #[serde(rename = "4-1s")]
    FourOneS,
    /// Ten consecutive observations on the same side of target.
    #[serde(rename = "10x")]
    TenX,
}

impl RuleKind {
    /// All rules in evaluation order.
    pub const ALL: [RuleKind; 5] = [
        RuleKind::OneThreeS,
        RuleKind::TwoTwoS,
        RuleKind::RFourS,
        RuleKind::FourOneS,
        RuleKind::TenX,
    ];

    /// Severity attached to a firing of this rule.
    pub fn severity(&self) -> Severity {
        match self {
            RuleKind::OneThreeS | RuleKind::RFourS => Severity::Action,
            RuleKind::TwoTwoS | RuleKind::FourOneS | RuleKind::TenX => Severity::Warn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::OneThreeS => "1-3s",
            RuleKind::TwoTwoS => "2-2s",
            RuleKind::RFourS => "R-4s",
            RuleKind::FourOneS => "4-1s",
            RuleKind::TenX => "10x",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single frequentist rule violation (or advisory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrequentistSignal {
    /// Rule tag, e.g. `1-3s`, or `no-baseline` for the advisory signal.
    pub rule: String,
    pub severity: Severity,
    /// Human-readable evidence carrying the triggering magnitude/direction.
    pub evidence: String,
}

impl FrequentistSignal {
    /// Signal for a fired control rule; severity comes from the rule kind.
    pub fn fired(rule: RuleKind, evidence: impl Into<String>) -> Self {
        FrequentistSignal {
            rule: rule.as_str().to_string(),
            severity: rule.severity(),
            evidence: evidence.into(),
        }
    }

    /// Advisory emitted when no baseline could be computed for the stream.
    pub fn no_baseline() -> Self {
        FrequentistSignal {
            rule: "no-baseline".to_string(),
            severity: Severity::Warn,
            evidence: "No baseline available for stream".to_string(),
        }
    }
}

/// 95% credible interval on the posterior mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CredibleInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Output of the Bayesian sequential estimator.
///
/// `probability_outside_limits` and `risk_score` are always present; the
/// derived posterior fields are omitted when the posterior does not support
/// them (e.g. `alpha_n <= 1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BayesianRisk {
    pub probability_outside_limits: f64,
    pub risk_score: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posterior_mean: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posterior_sigma: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictive_sigma: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credible_interval: Option<CredibleInterval>,
}

impl BayesianRisk {
    /// Zero-risk result used when no prior is configured for the stream.
    pub fn zero() -> Self {
        BayesianRisk {
            probability_outside_limits: 0.0,
            risk_score: 0,
            posterior_mean: None,
            posterior_sigma: None,
            predictive_sigma: None,
            credible_interval: None,
        }
    }
}

/// Categorical verdict for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Disposition {
    Accept,
    Monitor,
    HoldForReview,
    Reject,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Disposition::Accept => "accept",
            Disposition::Monitor => "monitor",
            Disposition::HoldForReview => "hold-for-review",
            Disposition::Reject => "reject",
        };
        write!(f, "{}", s)
    }
}

/// Severity scale used for alert records (distinct from signal severity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warn,
    Action,
}

/// Alert raised when a record draws signals or elevated risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Alert {
    pub id: AlertId,
    pub stream_id: StreamId,
    pub created_at: DateTime<Utc>,
    pub severity: AlertSeverity,
    pub signals: Vec<FrequentistSignal>,
    pub bayesian_risk: BayesianRisk,
    pub disposition: Disposition,

    #[serde(default)]
    pub acknowledged: bool,
}
