//! QC Sentinel core library.
//!
//! This library provides the decision engine for laboratory QC measurements:
//! - Store abstractions over configs, records, and posterior state
//! - Baseline estimation (configured or windowed)
//! - The frequentist control-rule engine
//! - The Bayesian sequential risk estimator
//! - The disposition policy combining both engines
//! - The ingestion orchestrator sequencing them per record
//!
//! The replay binary entry point is in `main.rs`.

pub mod audit;
pub mod baseline;
pub mod bayes;
pub mod disposition;
pub mod ingest;
pub mod logging;
pub mod rules;
pub mod scenario;
pub mod store;

pub use audit::AuditEntry;
pub use baseline::{baseline_stats, Baseline, BaselineSource};
pub use bayes::{infer_risk, rebuild_posterior};
pub use disposition::{alert_severity, decide};
pub use ingest::{ingest_record, IngestionOutcome};
pub use rules::evaluate_rules;
pub use scenario::Scenario;
pub use store::{
    ConfigStore, InMemoryStore, PosteriorState, PosteriorStore, RecordStore, SentinelStore,
};
