//! The accumulated wizard record and its persisted, versioned envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::crisis::CrisisMode;

use super::fields::FieldMap;

/// Current schema version of the persisted record.
pub const RECORD_VERSION: u32 = 1;

/// Everything the wizard has accepted so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardRecord {
    pub crisis_mode: CrisisMode,
    /// Disaster type or crisis type picked before the questionnaire starts.
    pub specific_threat: String,
    /// Fields copied in by successful `next()` calls.
    #[serde(default)]
    pub fields: FieldMap,
}

impl WizardRecord {
    pub fn new(crisis_mode: CrisisMode, specific_threat: impl Into<String>) -> Self {
        Self {
            crisis_mode,
            specific_threat: specific_threat.into(),
            fields: FieldMap::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedRecord {
    version: u32,
    saved_at: DateTime<Utc>,
    record: WizardRecord,
}

/// Wrap a record in the versioned envelope written to session storage.
pub fn encode(record: &WizardRecord) -> Result<Value, serde_json::Error> {
    serde_json::to_value(PersistedRecord {
        version: RECORD_VERSION,
        saved_at: Utc::now(),
        record: record.clone(),
    })
}

/// Unwrap a stored envelope. Unknown versions and undecodable documents are
/// dropped so the caller starts fresh.
pub fn decode(value: Value) -> Option<WizardRecord> {
    let version = value.get("version").and_then(Value::as_u64);
    if version != Some(u64::from(RECORD_VERSION)) {
        warn!(?version, expected = RECORD_VERSION, "Discarding stored wizard record with unknown version");
        return None;
    }
    match serde_json::from_value::<PersistedRecord>(value) {
        Ok(persisted) => Some(persisted.record),
        Err(e) => {
            warn!("Discarding undecodable wizard record: {}", e);
            None
        }
    }
}
