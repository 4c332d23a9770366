//! Ingestion orchestrator.
//!
//! Sequences the decision pipeline for one incoming record:
//! config resolution → unit/level/bounds validation → duplicate
//! classification and persist → rule evaluation → Bayesian risk →
//! disposition → alert/audit emission.

use chrono::Utc;
use qc_common::{
    Alert, AlertId, AlertSeverity, BayesianRisk, Disposition, DuplicateStatus, Error,
    FrequentistSignal, QcRecord, Result,
};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::info;

use crate::audit::AuditEntry;
use crate::bayes::infer_risk;
use crate::disposition::{alert_severity, decide};
use crate::rules::evaluate_rules;
use crate::store::SentinelStore;

/// Everything the pipeline produced for one record.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct IngestionOutcome {
    pub record: QcRecord,
    pub duplicate: DuplicateStatus,
    pub signals: Vec<FrequentistSignal>,
    pub bayesian_risk: BayesianRisk,
    pub disposition: Disposition,
    pub severity: AlertSeverity,
    pub alert: Option<Alert>,
    pub audit_entry: AuditEntry,
}

/// Run one record through the full decision pipeline.
///
/// The record's value is normalized to the stream's canonical units before
/// evaluation (via the config's conversion table when units differ).
/// Validation failures surface as errors and leave no trace in the store;
/// after the record is persisted the pipeline always completes.
pub fn ingest_record<S: SentinelStore + ?Sized>(
    store: &S,
    actor: &str,
    mut record: QcRecord,
) -> Result<IngestionOutcome> {
    if !record.has_finite_value() {
        return Err(Error::NonFiniteValue);
    }

    let config = store
        .effective_stream_config(&record.stream_id, record.timestamp)?
        .ok_or_else(|| Error::NotConfigured {
            stream_id: record.stream_id.to_string(),
        })?;

    if record.units != config.units {
        match config.convert_units(record.result_value, &record.units) {
            Some(converted) => {
                record.result_value = converted;
                record.units = config.units.clone();
            }
            None => {
                return Err(Error::UnitMismatch {
                    expected: config.units.clone(),
                    got: record.units.clone(),
                });
            }
        }
    }

    if record.qc_level != config.qc_level {
        return Err(Error::QcLevelMismatch {
            expected: config.qc_level.clone(),
            got: record.qc_level.clone(),
        });
    }

    let min = config.min_value.unwrap_or(f64::NEG_INFINITY);
    let max = config.max_value.unwrap_or(f64::INFINITY);
    if record.result_value < min || record.result_value > max {
        return Err(Error::OutOfBounds {
            value: record.result_value,
            min,
            max,
        });
    }

    let duplicate = store.append_record(record.clone())?;
    record.duplicate_status = duplicate;

    let signals = evaluate_rules(store, &config, record.result_value, record.timestamp)?;
    let risk = infer_risk(store, store, &config, record.result_value, record.timestamp)?;
    let disposition = decide(&signals, &risk, &config);
    let severity = alert_severity(&signals, &risk, &config);

    let alert = if !signals.is_empty() || risk.risk_score >= config.risk_threshold_warn {
        let alert = Alert {
            id: AlertId::new(),
            stream_id: record.stream_id.clone(),
            created_at: Utc::now(),
            severity,
            signals: signals.clone(),
            bayesian_risk: risk.clone(),
            disposition,
            acknowledged: false,
        };
        store.append_alert(alert.clone())?;
        Some(alert)
    } else {
        None
    };

    let audit_entry = AuditEntry::new(actor, "ingest_qc", "qc_record")
        .with_entity_id(record.stream_id.to_string())
        .with_after(serde_json::json!({
            "result_value": record.result_value,
            "timestamp": record.timestamp,
            "disposition": disposition,
            "risk_score": risk.risk_score,
            "signals": signals.iter().map(|s| s.rule.clone()).collect::<Vec<_>>(),
        }))
        .with_reason(record.comments.clone());
    store.append_audit(audit_entry.clone())?;

    info!(
        stream_id = %record.stream_id,
        disposition = %disposition,
        risk_score = risk.risk_score,
        signals = signals.len(),
        "record ingested"
    );

    Ok(IngestionOutcome {
        record,
        duplicate,
        signals,
        bayesian_risk: risk,
        disposition,
        severity,
        alert,
        audit_entry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use chrono::{DateTime, TimeZone, Utc};
    use qc_config::{PriorConfig, StreamConfig};

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, minute, 0).unwrap()
    }

    fn config() -> StreamConfig {
        serde_json::from_str(
            r#"{
                "stream_id": "hba1c-arch-l1",
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
        .unwrap()
    }

    fn prior() -> PriorConfig {
        PriorConfig {
            stream_id: "hba1c-arch-l1".into(),
            version: 1,
            effective_from: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            created_by: "system".to_string(),
            mu0: 5.2,
            kappa0: 4.0,
            alpha0: 3.0,
            beta0: 0.1875,
        }
    }

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.add_stream_config(config()).unwrap();
        store.add_prior(prior()).unwrap();
        store
    }

    fn record(minute: u32, value: f64) -> QcRecord {
        let mut record = QcRecord::measurement("hba1c-arch-l1", ts(minute), value);
        record.qc_level = "Level 1".to_string();
        record.units = "%".to_string();
        record
    }

    #[test]
    fn out_of_control_value_is_rejected_end_to_end() {
        let store = store();
        // z = (6.0 - 5.2) / 0.25 = 3.2
        let outcome = ingest_record(&store, "qc_analyst", record(1, 6.0)).unwrap();
        assert_eq!(outcome.disposition, Disposition::Reject);
        assert_eq!(outcome.severity, AlertSeverity::Action);
        assert!(outcome.signals.iter().any(|s| s.rule == "1-3s"));
        let alert = outcome.alert.expect("action record must raise an alert");
        assert_eq!(alert.disposition, Disposition::Reject);
        assert_eq!(store.alerts().unwrap().len(), 1);
        assert_eq!(store.audit_log().unwrap().len(), 1);
    }

    #[test]
    fn in_control_value_is_accepted_quietly() {
        let store = store();
        let outcome = ingest_record(&store, "qc_analyst", record(1, 5.21)).unwrap();
        assert_eq!(outcome.disposition, Disposition::Accept);
        assert_eq!(outcome.severity, AlertSeverity::Info);
        assert!(outcome.alert.is_none());
        assert!(store.alerts().unwrap().is_empty());
        // The audit trail is written regardless.
        assert_eq!(store.audit_log().unwrap().len(), 1);
    }

    #[test]
    fn unknown_stream_is_not_configured() {
        let store = InMemoryStore::new();
        let err = ingest_record(&store, "qc_analyst", record(1, 5.2)).unwrap_err();
        assert!(matches!(err, Error::NotConfigured { .. }));
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[test]
    fn mismatched_units_without_conversion_fail() {
        let store = store();
        let mut bad = record(1, 33.0);
        bad.units = "mmol/mol".to_string();
        let err = ingest_record(&store, "qc_analyst", bad).unwrap_err();
        assert!(matches!(err, Error::UnitMismatch { .. }));
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[test]
    fn configured_conversion_normalizes_units() {
        let store = InMemoryStore::new();
        let mut config = config();
        let mut table = std::collections::BTreeMap::new();
        table.insert("mmol/mol".to_string(), 0.1);
        config.unit_conversions = Some(table);
        store.add_stream_config(config).unwrap();
        store.add_prior(prior()).unwrap();

        let mut foreign = record(1, 52.0);
        foreign.units = "mmol/mol".to_string();
        let outcome = ingest_record(&store, "qc_analyst", foreign).unwrap();
        assert_eq!(outcome.record.units, "%");
        assert!((outcome.record.result_value - 5.2).abs() < 1e-12);
        assert_eq!(outcome.disposition, Disposition::Accept);
    }

    #[test]
    fn wrong_qc_level_fails() {
        let store = store();
        let mut bad = record(1, 5.2);
        bad.qc_level = "Level 2".to_string();
        let err = ingest_record(&store, "qc_analyst", bad).unwrap_err();
        assert!(matches!(err, Error::QcLevelMismatch { .. }));
    }

    #[test]
    fn bounds_are_enforced_when_configured() {
        let store = InMemoryStore::new();
        let mut config = config();
        config.min_value = Some(0.0);
        config.max_value = Some(20.0);
        store.add_stream_config(config).unwrap();
        let err = ingest_record(&store, "qc_analyst", record(1, 25.0)).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { .. }));
    }

    #[test]
    fn non_finite_value_fails_before_store_access() {
        let store = store();
        let err = ingest_record(&store, "qc_analyst", record(1, f64::NAN)).unwrap_err();
        assert!(matches!(err, Error::NonFiniteValue));
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[test]
    fn duplicate_statuses_flow_through() {
        let store = store();
        let first = ingest_record(&store, "qc_analyst", record(1, 5.2)).unwrap();
        assert_eq!(first.duplicate, DuplicateStatus::Unique);
        let second = ingest_record(&store, "qc_analyst", record(1, 5.2)).unwrap();
        assert_eq!(second.duplicate, DuplicateStatus::Duplicate);
        let third = ingest_record(&store, "qc_analyst", record(1, 5.3)).unwrap();
        assert_eq!(third.duplicate, DuplicateStatus::PossibleDuplicate);
    }
}
