//! QC Sentinel common types, IDs, and errors.
//!
//! This crate provides foundational types shared across qc-core modules:
//! - Stream and alert identity types
//! - QC measurement records and duplicate classification
//! - Rule signals, Bayesian risk, dispositions, and alerts
//! - The unified error type with stable codes

pub mod error;
pub mod id;
pub mod record;
pub mod verdict;

pub use error::{Error, ErrorCategory, Result};
pub use id::{AlertId, StreamId};
pub use record::{DuplicateStatus, EntrySource, QcRecord};
pub use verdict::{
    Alert, AlertSeverity, BayesianRisk, CredibleInterval, Disposition, FrequentistSignal,
    RuleKind, Severity,
};
