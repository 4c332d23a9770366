//! Frequentist control-rule engine.
//!
//! Evaluates the enabled Westgard-style rules against the current
//! measurement's z-score and a short trailing window of prior z-scores for
//! the same stream. Rules are independent: a record may trigger several.
//!
//! The 2-2s and R-4s windows deliberately look at only the single
//! immediately-preceding record, matching the behavior this engine was
//! calibrated against rather than the textbook multi-observation variants.

use chrono::{DateTime, Utc};
use qc_common::{FrequentistSignal, Result, RuleKind};
use qc_config::StreamConfig;
use tracing::debug;

use crate::baseline::baseline_stats;
use crate::store::RecordStore;

/// Trailing window size: enough for 10x (current + 9 prior).
const RULE_WINDOW: usize = 9;

/// Evaluate the enabled control rules for one measurement.
///
/// Returns a single `no-baseline` advisory when the baseline is missing or
/// degenerate, so ingestion is never blocked by absent statistical history.
pub fn evaluate_rules<R: RecordStore + ?Sized>(
    records: &R,
    config: &StreamConfig,
    value: f64,
    timestamp: DateTime<Utc>,
) -> Result<Vec<FrequentistSignal>> {
    let baseline = baseline_stats(records, config)?;
    if !baseline.is_usable() {
        return Ok(vec![FrequentistSignal::no_baseline()]);
    }

    let z = (value - baseline.target) / baseline.sigma;
    let prior = records.recent_records(&config.stream_id, timestamp, RULE_WINDOW)?;
    let prior_z: Vec<f64> = prior
        .iter()
        .map(|r| (r.result_value - baseline.target) / baseline.sigma)
        .collect();

    let warn = config.warning_limit_sd;
    let mut signals = Vec::new();

    for rule in RuleKind::ALL {
        if !config.rule_enabled(rule) {
            continue;
        }
        let fired = match rule {
            RuleKind::OneThreeS => {
                if z.abs() >= config.action_limit_sd {
                    Some(format!(
                        "|z|={:.2} at or beyond action limit {:.1} SD",
                        z.abs(),
                        config.action_limit_sd
                    ))
                } else {
                    None
                }
            }
            RuleKind::TwoTwoS => prior_z.last().and_then(|&prev| {
                let same_side_high = z >= warn && prev >= warn;
                let same_side_low = z <= -warn && prev <= -warn;
                if same_side_high || same_side_low {
                    let direction = if z > 0.0 { "high" } else { "low" };
                    Some(format!(
                        "consecutive {direction} deviations beyond {warn:.1} SD (z={z:.2}, previous z={prev:.2})"
                    ))
                } else {
                    None
                }
            }),
            RuleKind::RFourS => prior_z.last().and_then(|&prev| {
                let opposite = (z >= warn && prev <= -warn) || (z <= -warn && prev >= warn);
                if opposite {
                    Some(format!(
                        "range {:.2} SD across consecutive results (z={z:.2}, previous z={prev:.2})",
                        (z - prev).abs()
                    ))
                } else {
                    None
                }
            }),
            RuleKind::FourOneS => {
                if prior_z.len() >= 3 {
                    let last3 = &prior_z[prior_z.len() - 3..];
                    if z >= 1.0 && last3.iter().all(|&p| p >= 1.0) {
                        Some("4 consecutive results at or beyond +1 SD".to_string())
                    } else if z <= -1.0 && last3.iter().all(|&p| p <= -1.0) {
                        Some("4 consecutive results at or beyond -1 SD".to_string())
                    } else {
                        None
                    }
                } else {
                    None
                }
            }
            RuleKind::TenX => {
                if prior_z.len() >= 9 {
                    let last9 = &prior_z[prior_z.len() - 9..];
                    if z > 0.0 && last9.iter().all(|&p| p > 0.0) {
                        Some("10 consecutive results above target".to_string())
                    } else if z < 0.0 && last9.iter().all(|&p| p < 0.0) {
                        Some("10 consecutive results below target".to_string())
                    } else {
                        None
                    }
                } else {
                    None
                }
            }
        };

        if let Some(evidence) = fired {
            debug!(
                stream_id = %config.stream_id,
                rule = %rule,
                z = z,
                "control rule fired"
            );
            signals.push(FrequentistSignal::fired(rule, evidence));
        }
    }

    Ok(signals)
}
