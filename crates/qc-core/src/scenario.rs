//! Scenario files for the replay harness.
//!
//! A scenario bundles stream configs, priors, and a record sequence in one
//! JSON document so a whole stream history can be replayed deterministically.

use std::path::Path;

use serde::Deserialize;

use qc_common::{QcRecord, Result};
use qc_config::{validate_prior_config, validate_stream_config, PriorConfig, StreamConfig};

use crate::store::InMemoryStore;

/// On-disk scenario: configuration versions plus the record sequence.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub stream_configs: Vec<StreamConfig>,

    #[serde(default)]
    pub priors: Vec<PriorConfig>,

    #[serde(default)]
    pub records: Vec<QcRecord>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Validate every config version, collecting all problems.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for config in &self.stream_configs {
            if let Err(e) = validate_stream_config(config) {
                problems.push(format!(
                    "stream config {} v{}: {e}",
                    config.stream_id, config.version
                ));
            }
        }
        for prior in &self.priors {
            if let Err(e) = validate_prior_config(prior) {
                problems.push(format!(
                    "prior config {} v{}: {e}",
                    prior.stream_id, prior.version
                ));
            }
        }
        problems
    }

    /// Seed a fresh in-memory store with the scenario's configuration and
    /// return it with the records sorted by timestamp, ready to ingest.
    pub fn into_store(self) -> Result<(InMemoryStore, Vec<QcRecord>)> {
        let store = InMemoryStore::new();
        for config in self.stream_configs {
            store.add_stream_config(config)?;
        }
        for prior in self.priors {
            store.add_prior(prior)?;
        }
        let mut records = self.records;
        records.sort_by_key(|r| r.timestamp);
        Ok((store, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ConfigStore;
    use std::io::Write;

    const SCENARIO: &str = r#"{
        "stream_configs": [{
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
        }],
        "priors": [{
            "stream_id": "hba1c-arch-l1",
            "effective_from": "2026-01-01T00:00:00Z",
            "mu0": 5.2,
            "kappa0": 4.0,
            "alpha0": 3.0,
            "beta0": 0.1875
        }],
        "records": [{
            "stream_id": "hba1c-arch-l1",
            "timestamp": "2026-01-15T10:00:00Z",
            "result_value": 5.3,
            "analyte": "HbA1c",
            "qc_level": "Level 1",
            "instrument_id": "Architect",
            "method_id": "HPLC",
            "control_material_lot": "LOT-001",
            "units": "%"
        }]
    }"#;

    #[test]
    fn loads_and_validates_a_scenario_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCENARIO.as_bytes()).unwrap();

        let scenario = Scenario::load(file.path()).unwrap();
        assert_eq!(scenario.stream_configs.len(), 1);
        assert_eq!(scenario.priors.len(), 1);
        assert_eq!(scenario.records.len(), 1);
        assert!(scenario.validate().is_empty());

        let (store, records) = scenario.into_store().unwrap();
        assert_eq!(records.len(), 1);
        assert!(store
            .effective_stream_config(
                &"hba1c-arch-l1".into(),
                records[0].timestamp
            )
            .unwrap()
            .is_some());
    }

    #[test]
    fn invalid_sigma_is_reported_with_the_version() {
        let mut scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        scenario.stream_configs[0].sigma = 0.0;
        let problems = scenario.validate();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("stream config hba1c-arch-l1 v1"));
    }

    #[test]
    fn load_surfaces_missing_files_as_io_errors() {
        let err = Scenario::load(Path::new("/nonexistent/scenario.json")).unwrap_err();
        assert!(matches!(err, qc_common::Error::Io(_)));
    }
}
