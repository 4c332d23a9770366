//! Store abstractions consumed by the decision engine.
//!
//! The engine never touches global state: config resolution, record history,
//! and posterior persistence are injected through these traits so that
//! persistence backends are swappable and the core is testable in isolation.
//! Config and prior versions are append-only; [`PosteriorState`] is the only
//! mutable row, one per stream, and all writes to it go through
//! [`PosteriorStore::update`], which must not admit a concurrent writer for
//! the same stream between read and write.

pub mod memory;

use chrono::{DateTime, Utc};
use qc_common::{Alert, DuplicateStatus, QcRecord, Result, StreamId};
use qc_config::{PriorConfig, StreamConfig};
use qc_math::NigParams;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;

pub use memory::InMemoryStore;

/// Persisted Normal-Inverse-Gamma posterior for a stream.
///
/// Always derivable by replaying every `include_in_stats` record in
/// timestamp order from the prior effective at the first one; incremental
/// updates keep that equivalence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PosteriorState {
    pub mu_n: f64,
    pub kappa_n: f64,
    pub alpha_n: f64,
    pub beta_n: f64,
    /// Count of observations folded in.
    pub n_obs: u64,
    pub updated_at: DateTime<Utc>,
}

impl PosteriorState {
    pub fn from_params(params: NigParams, n_obs: u64, updated_at: DateTime<Utc>) -> Self {
        PosteriorState {
            mu_n: params.mu,
            kappa_n: params.kappa,
            alpha_n: params.alpha,
            beta_n: params.beta,
            n_obs,
            updated_at,
        }
    }

    pub fn params(&self) -> NigParams {
        NigParams::new(self.mu_n, self.kappa_n, self.alpha_n, self.beta_n)
    }
}

/// Time-indexed configuration lookup.
pub trait ConfigStore {
    /// The stream config version in force at `at`, or `None` when the
    /// stream has no versions at all.
    fn effective_stream_config(
        &self,
        stream_id: &StreamId,
        at: DateTime<Utc>,
    ) -> Result<Option<StreamConfig>>;

    /// The prior config version in force at `at`, or `None` when the
    /// stream has no prior versions at all.
    fn effective_prior(
        &self,
        stream_id: &StreamId,
        at: DateTime<Utc>,
    ) -> Result<Option<PriorConfig>>;
}

/// Historical record queries.
pub trait RecordStore {
    /// Up to `limit` records strictly before `before`, oldest-first.
    fn recent_records(
        &self,
        stream_id: &StreamId,
        before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<QcRecord>>;

    /// All records with timestamp in `[start, end]`, oldest-first.
    fn records_in_range(
        &self,
        stream_id: &StreamId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<QcRecord>>;

    /// All `include_in_stats` records, timestamp ascending.
    fn included_records(&self, stream_id: &StreamId) -> Result<Vec<QcRecord>>;
}

/// Posterior state persistence, keyed by stream.
pub trait PosteriorStore {
    fn get(&self, stream_id: &StreamId) -> Result<Option<PosteriorState>>;
    fn put(&self, stream_id: &StreamId, state: PosteriorState) -> Result<()>;
    fn delete(&self, stream_id: &StreamId) -> Result<()>;

    /// Atomic read-modify-write of a stream's posterior.
    ///
    /// The implementation must run `f` and persist its result without
    /// admitting a concurrent writer for the same stream in between, so
    /// that no update is lost. Returns the state that was written.
    fn update(
        &self,
        stream_id: &StreamId,
        f: &mut dyn FnMut(Option<PosteriorState>) -> PosteriorState,
    ) -> Result<PosteriorState>;
}

/// Full store surface the ingestion orchestrator needs.
pub trait SentinelStore: ConfigStore + RecordStore + PosteriorStore {
    /// Classify duplicates against existing records, persist the record with
    /// that classification, and return it.
    fn append_record(&self, record: QcRecord) -> Result<DuplicateStatus>;

    fn append_alert(&self, alert: Alert) -> Result<()>;

    fn append_audit(&self, entry: AuditEntry) -> Result<()>;
}
