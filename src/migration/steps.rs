//! Registered migration steps per dataset kind
//!
//! Index `i` in each list upgrades a dataset from version `i` to `i + 1`.
//! Steps are append-only: once released, a step is never edited or reordered.

use serde_json::{Map, Value};
use tracing::warn;

use super::{DatasetKind, MigrationError, VERSION_FIELD};

/// A single schema upgrade over a dataset envelope
pub type MigrationStep = fn(Map<String, Value>) -> Result<Map<String, Value>, MigrationError>;

pub(super) const MODULE_STEPS: &[MigrationStep] = &[modules_v1_sequence, modules_v2_image_data];
pub(super) const CLIENT_STEPS: &[MigrationStep] = &[clients_v1_sequence];
pub(super) const BUDGET_STEPS: &[MigrationStep] = &[budgets_v1_sequence];

fn modules_v1_sequence(data: Map<String, Value>) -> Result<Map<String, Value>, MigrationError> {
    Ok(coerce_sequence(data, DatasetKind::Modules, 1))
}

/// Modules gained inline image data; older records get an empty string
fn modules_v2_image_data(data: Map<String, Value>) -> Result<Map<String, Value>, MigrationError> {
    let key = DatasetKind::Modules.key();
    let mut data = coerce_sequence(data, DatasetKind::Modules, 2);
    if let Some(Value::Array(records)) = data.get_mut(key) {
        for (index, record) in records.iter_mut().enumerate() {
            let Value::Object(module) = record else {
                return Err(MigrationError::MalformedRecord {
                    kind: DatasetKind::Modules,
                    version: 2,
                    index,
                });
            };
            let missing = matches!(module.get("imageData"), None | Some(Value::Null));
            if missing {
                module.insert("imageData".to_string(), Value::String(String::new()));
            }
        }
    }
    Ok(data)
}

fn clients_v1_sequence(data: Map<String, Value>) -> Result<Map<String, Value>, MigrationError> {
    Ok(coerce_sequence(data, DatasetKind::Clients, 1))
}

fn budgets_v1_sequence(data: Map<String, Value>) -> Result<Map<String, Value>, MigrationError> {
    Ok(coerce_sequence(data, DatasetKind::Budgets, 1))
}

/// Force the payload field into an array, defaulting to empty
fn coerce_sequence(mut data: Map<String, Value>, kind: DatasetKind, version: u64) -> Map<String, Value> {
    let key = kind.key();
    match data.get(key) {
        Some(Value::Array(_)) => {}
        None | Some(Value::Null) => {
            data.insert(key.to_string(), Value::Array(Vec::new()));
        }
        Some(_) => {
            warn!(key, version, "payload is not a list, replacing with an empty list");
            data.insert(key.to_string(), Value::Array(Vec::new()));
        }
    }
    stamp(&mut data, version);
    data
}

fn stamp(data: &mut Map<String, Value>, version: u64) {
    data.insert(VERSION_FIELD.to_string(), Value::from(version));
}
