//! Versioned dataset migrations
//!
//! Every persisted dataset is stored as an envelope of the form
//! `{ "version": N, "<key>": payload }`. Each [`DatasetKind`] owns an ordered
//! list of steps; step `i` lifts a dataset from version `i` to `i + 1`.
//! [`migrate`] applies the pending steps in order until the dataset reaches
//! the latest version for its kind.
//!
//! # Example
//!
//! ```rust,ignore
//! use asedex::migration::{migrate, DatasetKind};
//! use serde_json::json;
//!
//! let upgraded = migrate(json!({}), DatasetKind::Modules)?;
//! assert_eq!(upgraded, json!({ "version": 2, "modules": [] }));
//! ```

mod steps;

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub use steps::MigrationStep;

/// Field holding the schema version inside a dataset envelope
pub const VERSION_FIELD: &str = "version";

/// The named datasets that go through the migration engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Modules,
    Clients,
    Budgets,
    AuthState,
}

impl DatasetKind {
    /// Every kind, in the order the storage coordinator opens them
    pub fn all() -> &'static [DatasetKind] {
        &[
            DatasetKind::Modules,
            DatasetKind::Clients,
            DatasetKind::Budgets,
            DatasetKind::AuthState,
        ]
    }

    /// Key naming both the dataset and its payload field
    pub fn key(&self) -> &'static str {
        match self {
            Self::Modules => "modules",
            Self::Clients => "clients",
            Self::Budgets => "budgets",
            Self::AuthState => "authState",
        }
    }

    /// Name of the physical store backing this dataset
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Modules => "modules",
            Self::Clients => "clients",
            Self::Budgets => "budgets",
            Self::AuthState => "auth",
        }
    }

    /// Ordered migration steps for this dataset
    pub fn steps(&self) -> &'static [MigrationStep] {
        match self {
            Self::Modules => steps::MODULE_STEPS,
            Self::Clients => steps::CLIENT_STEPS,
            Self::Budgets => steps::BUDGET_STEPS,
            Self::AuthState => &[],
        }
    }

    /// The version every dataset of this kind converges to
    pub fn latest_version(&self) -> u64 {
        self.steps().len() as u64
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetKind::all()
            .iter()
            .copied()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| format!("unknown dataset key: {}", s))
    }
}

/// Failures raised while upgrading a dataset
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MigrationError {
    /// A record could not be upgraded because it is not a JSON object
    #[error("{kind} record at index {index} is malformed (migrating to version {version})")]
    MalformedRecord {
        kind: DatasetKind,
        version: u64,
        index: usize,
    },

    /// The stored dataset was written by a newer schema than this build knows
    #[error("{kind} is stored at version {found}, newer than supported version {latest}")]
    NewerThanSupported {
        kind: DatasetKind,
        found: u64,
        latest: u64,
    },
}

/// Read the stored version of a dataset; absent or non-integer means 0
pub fn stored_version(dataset: &Value) -> u64 {
    dataset
        .get(VERSION_FIELD)
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// Whether a dataset still has steps to run
pub fn needs_migration(dataset: &Value, kind: DatasetKind) -> bool {
    stored_version(dataset) < kind.latest_version()
}

/// Upgrade a dataset to the latest version for its kind
///
/// Steps run strictly in registration order starting at the stored version.
/// A failing step aborts the migration and its error is returned unchanged.
pub fn migrate(dataset: Value, kind: DatasetKind) -> Result<Value, MigrationError> {
    let steps = kind.steps();
    let latest = kind.latest_version();

    let mut current = stored_version(&dataset);
    if current > latest {
        return Err(MigrationError::NewerThanSupported {
            kind,
            found: current,
            latest,
        });
    }

    let mut data = match dataset {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            warn!(key = kind.key(), found = %type_name(&other), "dataset is not an object, starting empty");
            Map::new()
        }
    };

    while current < latest {
        data = steps[current as usize](data)?;
        current += 1;
        debug!(key = kind.key(), version = current, "applied migration step");
    }

    if !data.contains_key(VERSION_FIELD) {
        data.insert(VERSION_FIELD.to_string(), Value::from(current));
    }

    Ok(Value::Object(data))
}

/// Upgrade a dataset named by its string key
///
/// Keys with no registered dataset are logged and returned wrapped under the
/// key, untouched.
pub fn migrate_keyed(dataset: Value, key: &str) -> Result<Value, MigrationError> {
    match key.parse::<DatasetKind>() {
        Ok(kind) => migrate(dataset, kind),
        Err(_) => {
            warn!(key, "no migrations found for key");
            let mut wrapped = Map::new();
            wrapped.insert(key.to_string(), dataset);
            Ok(Value::Object(wrapped))
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
