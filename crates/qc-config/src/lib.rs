//! Versioned QC stream and prior configuration.
//!
//! Configuration is append-only and effective-dated: each version of a
//! stream's config carries an `effective_from` timestamp and an integer
//! `version`, and exactly one version governs any evaluated timestamp
//! (see [`resolve`] for the selection rule).

pub mod priors;
pub mod resolve;
pub mod stream;
pub mod validate;

pub use priors::PriorConfig;
pub use resolve::{resolve_effective, Versioned};
pub use stream::{StreamConfig, DEFAULT_RULE_SET};
pub use validate::{validate_prior_config, validate_stream_config, ValidationError};
