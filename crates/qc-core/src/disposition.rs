//! Disposition policy combining rule signals and Bayesian risk.
//!
//! Pure functions of the two engines' outputs against the current config's
//! thresholds. Action-severity signals dominate: no risk score can soften
//! a rule violation at action severity.

use qc_common::{AlertSeverity, BayesianRisk, Disposition, FrequentistSignal, Severity};
use qc_config::StreamConfig;

/// Categorical verdict for a record.
pub fn decide(
    signals: &[FrequentistSignal],
    risk: &BayesianRisk,
    config: &StreamConfig,
) -> Disposition {
    let any_action = signals.iter().any(|s| s.severity == Severity::Action);
    if any_action {
        return Disposition::Reject;
    }
    if risk.risk_score >= config.risk_threshold_hold {
        return Disposition::HoldForReview;
    }
    if !signals.is_empty() || risk.risk_score >= config.risk_threshold_warn {
        return Disposition::Monitor;
    }
    Disposition::Accept
}

/// Severity for the alert record, a distinct scale from signal severity.
pub fn alert_severity(
    signals: &[FrequentistSignal],
    risk: &BayesianRisk,
    config: &StreamConfig,
) -> AlertSeverity {
    let any_action = signals.iter().any(|s| s.severity == Severity::Action);
    if any_action || risk.risk_score >= config.risk_threshold_hold {
        return AlertSeverity::Action;
    }
    if !signals.is_empty() || risk.risk_score >= config.risk_threshold_warn {
        return AlertSeverity::Warn;
    }
    AlertSeverity::Info
}
