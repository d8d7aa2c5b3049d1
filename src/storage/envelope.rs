//! Dataset envelopes shared by both caches
//!
//! A cache stores `{ "version": N, "<key>": payload }`. These helpers wrap a
//! typed payload, bring a stored value up to date through the migration engine,
//! and pull the typed payload back out.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AsedexError, AsedexResult};
use crate::migration::{self, DatasetKind, VERSION_FIELD};

/// What loading a dataset did to the stored data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairOutcome {
    pub kind: DatasetKind,
    /// Version found in the store (0 when absent or unversioned)
    pub from_version: u64,
    /// Version after migration
    pub to_version: u64,
    /// Whether anything was stored before
    pub was_stored: bool,
    /// Whether the migrated envelope differs from what was stored
    pub changed: bool,
    /// Whether the migrated envelope was written back
    pub written: bool,
}

impl RepairOutcome {
    /// Stored data that still needs to be persisted in migrated form
    pub fn is_pending(&self) -> bool {
        self.changed && !self.written
    }
}

/// A loaded dataset: the migrated envelope and its typed payload
pub(crate) struct Settled<T> {
    pub envelope: Value,
    pub value: T,
    pub outcome: RepairOutcome,
}

/// `{ "<key>": payload }` without a version, ready for a full migration
pub(crate) fn wrap_payload<T: Serialize>(kind: DatasetKind, payload: &T) -> AsedexResult<Value> {
    let payload = serde_json::to_value(payload).map_err(|e| {
        AsedexError::Json(format!("Failed to serialize {}: {}", kind.key(), e))
    })?;
    let mut map = Map::new();
    map.insert(kind.key().to_string(), payload);
    Ok(Value::Object(map))
}

/// `{ "version": latest, "<key>": payload }` for a payload already in current shape
pub(crate) fn stamp_latest<T: Serialize>(kind: DatasetKind, payload: &T) -> AsedexResult<Value> {
    let mut envelope = wrap_payload(kind, payload)?;
    if let Value::Object(map) = &mut envelope {
        map.insert(VERSION_FIELD.to_string(), Value::from(kind.latest_version()));
    }
    Ok(envelope)
}

/// Older builds stored the bare payload under the key; wrap it as version 0
fn normalize_stored(kind: DatasetKind, raw: Value) -> Value {
    match &raw {
        Value::Object(map) if map.contains_key(VERSION_FIELD) || map.contains_key(kind.key()) => raw,
        _ => {
            let mut map = Map::new();
            map.insert(kind.key().to_string(), raw);
            Value::Object(map)
        }
    }
}

/// Bring a stored value (or the initial value, when nothing is stored) to the latest version
pub(crate) fn settle<T>(kind: DatasetKind, stored: Option<Value>, initial: &T) -> AsedexResult<Settled<T>>
where
    T: Serialize + DeserializeOwned + Clone,
{
    let (envelope, from_version, was_stored, changed) = match stored {
        Some(raw) => {
            let normalized = normalize_stored(kind, raw.clone());
            let from_version = migration::stored_version(&normalized);
            let migrated = migration::migrate(normalized, kind)?;
            let changed = migrated != raw;
            (migrated, from_version, true, changed)
        }
        None => {
            let migrated = migration::migrate(wrap_payload(kind, initial)?, kind)?;
            (migrated, 0, false, true)
        }
    };

    let value = extract_payload(kind, &envelope, initial)?;
    let outcome = RepairOutcome {
        kind,
        from_version,
        to_version: migration::stored_version(&envelope),
        was_stored,
        changed,
        written: false,
    };

    Ok(Settled {
        envelope,
        value,
        outcome,
    })
}

/// Typed payload of an envelope; a missing payload yields the initial value
pub(crate) fn extract_payload<T>(kind: DatasetKind, envelope: &Value, initial: &T) -> AsedexResult<T>
where
    T: DeserializeOwned + Clone,
{
    match envelope.get(kind.key()) {
        None | Some(Value::Null) => Ok(initial.clone()),
        Some(payload) => T::deserialize(payload).map_err(|e| {
            AsedexError::Json(format!("Stored {} do not match the expected shape: {}", kind.key(), e))
        }),
    }
}
