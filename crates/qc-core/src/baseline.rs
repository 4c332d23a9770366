//! Baseline estimation for z-scoring.
//!
//! A stream's baseline (target, sigma) comes either from its configured
//! fixed values or, when the config carries a baseline window with at least
//! two included records, from the sample statistics of that window.

use qc_common::Result;
use qc_config::StreamConfig;
use serde::Serialize;

use crate::store::RecordStore;

/// Where a baseline came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
    /// Fixed (target_value, sigma) from the stream config.
    Configured,
    /// Sample statistics over the configured baseline window.
    Window { n: usize },
}

/// Baseline statistics used by both decision engines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    pub target: f64,
    pub sigma: f64,
    pub source: BaselineSource,
}

impl Baseline {
    /// Whether sigma supports z-scoring.
    pub fn is_usable(&self) -> bool {
        self.target.is_finite() && self.sigma.is_finite() && self.sigma > 0.0
    }
}

/// Compute the baseline for a stream config.
///
/// Window statistics use the sample mean and Bessel-corrected sample
/// standard deviation (n-1 divisor). Records excluded from statistics do
/// not count toward the window. Fewer than two window records falls back
/// to the configured values.
pub fn baseline_stats<R: RecordStore + ?Sized>(
    records: &R,
    config: &StreamConfig,
) -> Result<Baseline> {
    if let (Some(start), Some(end)) = (config.baseline_start, config.baseline_end) {
        let window = records.records_in_range(&config.stream_id, start, end)?;
        let values: Vec<f64> = window
            .iter()
            .filter(|r| r.include_in_stats)
            .map(|r| r.result_value)
            .collect();
        if values.len() >= 2 {
            let n = values.len();
            let mean = values.iter().sum::<f64>() / n as f64;
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            let sigma = (ss / (n - 1) as f64).sqrt();
            return Ok(Baseline {
                target: mean,
                sigma,
                source: BaselineSource::Window { n },
            });
        }
    }

    Ok(Baseline {
        target: config.target_value,
        sigma: config.sigma,
        source: BaselineSource::Configured,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, SentinelStore};
    use chrono::{DateTime, TimeZone, Utc};
    use qc_common::QcRecord;
    use qc_config::StreamConfig;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, minute, 0).unwrap()
    }

    fn config_with_window(start: Option<u32>, end: Option<u32>) -> StreamConfig {
        let mut config: StreamConfig = serde_json::from_str(
            r#"{
                "stream_id": "stream-a",
                "effective_from": "2026-01-01T00:00:00Z",
                "analyte": "HbA1c",
                "method": "HPLC",
                "instrument": "Architect",
                "qc_level": "Level 1",
                "control_material_lot": "LOT-001",
                "units": "%",
                "target_value": 5.2,
                "sigma": 0.25
            }"#,
        )
        .unwrap();
        config.baseline_start = start.map(ts);
        config.baseline_end = end.map(ts);
        config
    }

    #[test]
    fn no_window_returns_configured_values() {
        let store = InMemoryStore::new();
        let baseline = baseline_stats(&store, &config_with_window(None, None)).unwrap();
        assert_eq!(baseline.target, 5.2);
        assert_eq!(baseline.sigma, 0.25);
        assert_eq!(baseline.source, BaselineSource::Configured);
        assert!(baseline.is_usable());
    }

    #[test]
    fn window_with_two_records_overrides_config() {
        let store = InMemoryStore::new();
        store
            .append_record(QcRecord::measurement("stream-a", ts(1), 5.0))
            .unwrap();
        store
            .append_record(QcRecord::measurement("stream-a", ts(2), 5.4))
            .unwrap();
        let baseline = baseline_stats(&store, &config_with_window(Some(0), Some(5))).unwrap();
        assert!((baseline.target - 5.2).abs() < 1e-12);
        // Sample stdev of [5.0, 5.4] with Bessel's correction.
        assert!((baseline.sigma - 0.282_842_712_474_619).abs() < 1e-9);
        assert_eq!(baseline.source, BaselineSource::Window { n: 2 });
    }

    #[test]
    fn single_window_record_falls_back() {
        let store = InMemoryStore::new();
        store
            .append_record(QcRecord::measurement("stream-a", ts(1), 5.0))
            .unwrap();
        let baseline = baseline_stats(&store, &config_with_window(Some(0), Some(5))).unwrap();
        assert_eq!(baseline.source, BaselineSource::Configured);
        assert_eq!(baseline.sigma, 0.25);
    }

    #[test]
    fn excluded_records_do_not_count() {
        let store = InMemoryStore::new();
        store
            .append_record(QcRecord::measurement("stream-a", ts(1), 5.0))
            .unwrap();
        store
            .append_record(QcRecord::measurement("stream-a", ts(2), 5.4))
            .unwrap();
        store
            .set_include_in_stats(&"stream-a".into(), ts(2), false)
            .unwrap();
        let baseline = baseline_stats(&store, &config_with_window(Some(0), Some(5))).unwrap();
        assert_eq!(baseline.source, BaselineSource::Configured);
    }

    #[test]
    fn identical_window_values_yield_unusable_sigma() {
        let store = InMemoryStore::new();
        store
            .append_record(QcRecord::measurement("stream-a", ts(1), 5.2))
            .unwrap();
        store
            .append_record(QcRecord::measurement("stream-a", ts(2), 5.2))
            .unwrap();
        let baseline = baseline_stats(&store, &config_with_window(Some(0), Some(5))).unwrap();
        assert_eq!(baseline.sigma, 0.0);
        assert!(!baseline.is_usable());
    }
}
