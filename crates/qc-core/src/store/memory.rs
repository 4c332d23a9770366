//! In-memory store for tests and scenario replays.
//!
//! A single mutex guards all tables. Posterior read-modify-writes go
//! through [`PosteriorStore::update`], which holds that lock for the whole
//! cycle; separate `get`/`put` calls are NOT atomic. Real deployments
//! replace this with a transactional backend implementing the same traits.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use qc_common::{Alert, DuplicateStatus, Error, QcRecord, Result, StreamId};
use qc_config::{resolve_effective, PriorConfig, StreamConfig};

use crate::audit::AuditEntry;
use crate::store::{
    ConfigStore, PosteriorState, PosteriorStore, RecordStore, SentinelStore,
};

#[derive(Debug, Default)]
struct Tables {
    stream_configs: Vec<StreamConfig>,
    priors: Vec<PriorConfig>,
    records: Vec<QcRecord>,
    posteriors: HashMap<StreamId, PosteriorState>,
    alerts: Vec<Alert>,
    audit_log: Vec<AuditEntry>,
}

/// In-memory implementation of all store traits.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| Error::Store("store mutex poisoned".to_string()))
    }

    /// Append a new config version for a stream.
    pub fn add_stream_config(&self, config: StreamConfig) -> Result<()> {
        self.lock()?.stream_configs.push(config);
        Ok(())
    }

    /// Append a new prior version for a stream.
    pub fn add_prior(&self, prior: PriorConfig) -> Result<()> {
        self.lock()?.priors.push(prior);
        Ok(())
    }

    /// Flip `include_in_stats` on every record matching (stream, timestamp).
    /// Returns the number of records touched.
    pub fn set_include_in_stats(
        &self,
        stream_id: &StreamId,
        timestamp: DateTime<Utc>,
        include: bool,
    ) -> Result<usize> {
        let mut tables = self.lock()?;
        let mut touched = 0;
        for record in tables
            .records
            .iter_mut()
            .filter(|r| &r.stream_id == stream_id && r.timestamp == timestamp)
        {
            record.include_in_stats = include;
            touched += 1;
        }
        Ok(touched)
    }

    pub fn alerts(&self) -> Result<Vec<Alert>> {
        Ok(self.lock()?.alerts.clone())
    }

    pub fn audit_log(&self) -> Result<Vec<AuditEntry>> {
        Ok(self.lock()?.audit_log.clone())
    }

    pub fn record_count(&self) -> Result<usize> {
        Ok(self.lock()?.records.len())
    }

    fn classify_duplicate(tables: &Tables, record: &QcRecord) -> DuplicateStatus {
        let mut same_timestamp = false;
        for existing in tables
            .records
            .iter()
            .filter(|r| r.stream_id == record.stream_id && r.timestamp == record.timestamp)
        {
            if existing.result_value == record.result_value {
                return DuplicateStatus::Duplicate;
            }
            same_timestamp = true;
        }
        if same_timestamp {
            DuplicateStatus::PossibleDuplicate
        } else {
            DuplicateStatus::Unique
        }
    }
}

impl ConfigStore for InMemoryStore {
    fn effective_stream_config(
        &self,
        stream_id: &StreamId,
        at: DateTime<Utc>,
    ) -> Result<Option<StreamConfig>> {
        let tables = self.lock()?;
        let versions = tables
            .stream_configs
            .iter()
            .filter(|c| &c.stream_id == stream_id);
        Ok(resolve_effective(versions, at).cloned())
    }

    fn effective_prior(
        &self,
        stream_id: &StreamId,
        at: DateTime<Utc>,
    ) -> Result<Option<PriorConfig>> {
        let tables = self.lock()?;
        let versions = tables.priors.iter().filter(|p| &p.stream_id == stream_id);
        Ok(resolve_effective(versions, at).cloned())
    }
}

impl RecordStore for InMemoryStore {
    fn recent_records(
        &self,
        stream_id: &StreamId,
        before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<QcRecord>> {
        let tables = self.lock()?;
        let mut matching: Vec<QcRecord> = tables
            .records
            .iter()
            .filter(|r| &r.stream_id == stream_id && r.timestamp < before)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.timestamp);
        if matching.len() > limit {
            matching.drain(..matching.len() - limit);
        }
        Ok(matching)
    }

    fn records_in_range(
        &self,
        stream_id: &StreamId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<QcRecord>> {
        let tables = self.lock()?;
        let mut matching: Vec<QcRecord> = tables
            .records
            .iter()
            .filter(|r| &r.stream_id == stream_id && r.timestamp >= start && r.timestamp <= end)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.timestamp);
        Ok(matching)
    }

    fn included_records(&self, stream_id: &StreamId) -> Result<Vec<QcRecord>> {
        let tables = self.lock()?;
        let mut matching: Vec<QcRecord> = tables
            .records
            .iter()
            .filter(|r| &r.stream_id == stream_id && r.include_in_stats)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.timestamp);
        Ok(matching)
    }
}

impl PosteriorStore for InMemoryStore {
    fn get(&self, stream_id: &StreamId) -> Result<Option<PosteriorState>> {
        Ok(self.lock()?.posteriors.get(stream_id).cloned())
    }

    fn put(&self, stream_id: &StreamId, state: PosteriorState) -> Result<()> {
        self.lock()?.posteriors.insert(stream_id.clone(), state);
        Ok(())
    }

    fn delete(&self, stream_id: &StreamId) -> Result<()> {
        self.lock()?.posteriors.remove(stream_id);
        Ok(())
    }

    fn update(
        &self,
        stream_id: &StreamId,
        f: &mut dyn FnMut(Option<PosteriorState>) -> PosteriorState,
    ) -> Result<PosteriorState> {
        // One lock hold across read, modify, and write.
        let mut tables = self.lock()?;
        let next = f(tables.posteriors.get(stream_id).cloned());
        tables.posteriors.insert(stream_id.clone(), next.clone());
        Ok(next)
    }
}

impl SentinelStore for InMemoryStore {
    fn append_record(&self, mut record: QcRecord) -> Result<DuplicateStatus> {
        let mut tables = self.lock()?;
        let status = Self::classify_duplicate(&tables, &record);
        record.duplicate_status = status;
        tables.records.push(record);
        Ok(status)
    }

    fn append_alert(&self, alert: Alert) -> Result<()> {
        self.lock()?.alerts.push(alert);
        Ok(())
    }

    fn append_audit(&self, entry: AuditEntry) -> Result<()> {
        self.lock()?.audit_log.push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, minute, 0).unwrap()
    }

    fn record(minute: u32, value: f64) -> QcRecord {
        QcRecord::measurement("stream-a", ts(minute), value)
    }

    #[test]
    fn duplicate_classification() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.append_record(record(0, 5.0)).unwrap(),
            DuplicateStatus::Unique
        );
        assert_eq!(
            store.append_record(record(0, 5.1)).unwrap(),
            DuplicateStatus::PossibleDuplicate
        );
        assert_eq!(
            store.append_record(record(0, 5.0)).unwrap(),
            DuplicateStatus::Duplicate
        );
        // Other streams never collide.
        let mut other = record(0, 5.0);
        other.stream_id = StreamId::from("stream-b");
        assert_eq!(
            store.append_record(other).unwrap(),
            DuplicateStatus::Unique
        );
    }

    #[test]
    fn recent_records_strictly_before_oldest_first() {
        let store = InMemoryStore::new();
        for minute in [3, 1, 2, 5] {
            store
                .append_record(record(minute, f64::from(minute)))
                .unwrap();
        }
        let stream = StreamId::from("stream-a");
        let recent = store.recent_records(&stream, ts(5), 2).unwrap();
        let minutes: Vec<f64> = recent.iter().map(|r| r.result_value).collect();
        // Strictly before minute 5, newest two, oldest-first.
        assert_eq!(minutes, vec![2.0, 3.0]);
    }

    #[test]
    fn range_query_is_inclusive() {
        let store = InMemoryStore::new();
        for minute in [1, 2, 3, 4] {
            store
                .append_record(record(minute, f64::from(minute)))
                .unwrap();
        }
        let stream = StreamId::from("stream-a");
        let window = store.records_in_range(&stream, ts(2), ts(3)).unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].result_value, 2.0);
        assert_eq!(window[1].result_value, 3.0);
    }

    #[test]
    fn included_records_honors_exclusions() {
        let store = InMemoryStore::new();
        store.append_record(record(1, 5.0)).unwrap();
        store.append_record(record(2, 5.1)).unwrap();
        let stream = StreamId::from("stream-a");
        assert_eq!(store.set_include_in_stats(&stream, ts(1), false).unwrap(), 1);
        let included = store.included_records(&stream).unwrap();
        assert_eq!(included.len(), 1);
        assert_eq!(included[0].result_value, 5.1);
    }

    #[test]
    fn posterior_crud() {
        let store = InMemoryStore::new();
        let stream = StreamId::from("stream-a");
        assert!(store.get(&stream).unwrap().is_none());
        let state = PosteriorState {
            mu_n: 5.2,
            kappa_n: 2.0,
            alpha_n: 1.5,
            beta_n: 0.2,
            n_obs: 1,
            updated_at: ts(1),
        };
        store.put(&stream, state.clone()).unwrap();
        assert_eq!(store.get(&stream).unwrap(), Some(state));
        store.delete(&stream).unwrap();
        assert!(store.get(&stream).unwrap().is_none());
    }

    #[test]
    fn update_applies_over_the_current_state() {
        let store = InMemoryStore::new();
        let stream = StreamId::from("stream-a");

        let first = store
            .update(&stream, &mut |existing| {
                assert!(existing.is_none());
                PosteriorState {
                    mu_n: 5.2,
                    kappa_n: 1.0,
                    alpha_n: 1.0,
                    beta_n: 0.2,
                    n_obs: 1,
                    updated_at: ts(1),
                }
            })
            .unwrap();
        assert_eq!(first.n_obs, 1);

        let second = store
            .update(&stream, &mut |existing| {
                let mut state = existing.expect("state written by first update");
                state.n_obs += 1;
                state.updated_at = ts(2);
                state
            })
            .unwrap();
        assert_eq!(second.n_obs, 2);
        assert_eq!(store.get(&stream).unwrap().unwrap().n_obs, 2);
    }
}
