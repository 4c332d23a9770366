//! Audit log entries.
//!
//! Every ingestion produces one entry recording who did what to which
//! entity, with before/after payloads for traceability. Persistence format
//! is the caller's concern; the core only constructs entries.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub action: String,
    pub entity_type: String,

    #[serde(default)]
    pub entity_id: Option<String>,

    #[serde(default)]
    pub before: Option<serde_json::Value>,

    #[serde(default)]
    pub after: Option<serde_json::Value>,

    #[serde(default)]
    pub reason: Option<String>,
}

impl AuditEntry {
    /// New entry timestamped now.
    pub fn new(
        actor: impl Into<String>,
        action: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Self {
        AuditEntry {
            timestamp: Utc::now(),
            actor: actor.into(),
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: None,
            before: None,
            after: None,
            reason: None,
        }
    }

    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_after(mut self, after: serde_json::Value) -> Self {
        self.after = Some(after);
        self
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_optional_fields() {
        let entry = AuditEntry::new("qc_analyst", "ingest_qc", "qc_record")
            .with_entity_id("hba1c-arch-l1")
            .with_after(serde_json::json!({"disposition": "accept"}))
            .with_reason(Some("routine".to_string()));
        assert_eq!(entry.actor, "qc_analyst");
        assert_eq!(entry.entity_id.as_deref(), Some("hba1c-arch-l1"));
        assert_eq!(entry.after.unwrap()["disposition"], "accept");
        assert_eq!(entry.reason.as_deref(), Some("routine"));
    }
}
