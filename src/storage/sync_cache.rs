//! Keyed cache over a synchronous text medium
//!
//! Unlike [`PersistentCache`](super::cache::PersistentCache), the value is
//! resolved eagerly when the cache is opened, the cache (de)serializes JSON
//! itself, and every write goes through the full migration chain before it
//! reaches the medium.

use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::envelope::{settle, wrap_payload, RepairOutcome};
use super::store::TextStore;
use crate::config::ReadRepair;
use crate::error::{AsedexError, AsedexResult};
use crate::migration::{migrate, DatasetKind};

/// Eagerly loaded keyed cache over a [`TextStore`]
pub struct SyncCache<T, S> {
    kind: DatasetKind,
    store: S,
    value: RwLock<T>,
    outcome: RwLock<Option<RepairOutcome>>,
    load_error: Option<String>,
}

impl<T, S> SyncCache<T, S>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
    S: TextStore,
{
    /// Open the cache, falling back to `initial` if the stored value can't be loaded
    ///
    /// The failure is logged and kept available through [`load_error`](Self::load_error).
    pub fn open(kind: DatasetKind, store: S, initial: T, repair: ReadRepair) -> Self {
        match Self::load(kind, &store, &initial, repair) {
            Ok((value, outcome)) => Self::assemble(kind, store, value, Some(outcome), None),
            Err(e) => {
                error!(key = kind.key(), operation = "open", error = %e, "failed to load dataset");
                Self::assemble(kind, store, initial, None, Some(e.to_string()))
            }
        }
    }

    /// Open the cache, returning any load or migration failure
    pub fn try_open(kind: DatasetKind, store: S, initial: T, repair: ReadRepair) -> AsedexResult<Self> {
        let (value, outcome) = Self::load(kind, &store, &initial, repair).map_err(|e| {
            error!(key = kind.key(), operation = "open", error = %e, "failed to load dataset");
            e
        })?;
        Ok(Self::assemble(kind, store, value, Some(outcome), None))
    }

    fn assemble(
        kind: DatasetKind,
        store: S,
        value: T,
        outcome: Option<RepairOutcome>,
        load_error: Option<String>,
    ) -> Self {
        Self {
            kind,
            store,
            value: RwLock::new(value),
            outcome: RwLock::new(outcome),
            load_error,
        }
    }

    fn load(
        kind: DatasetKind,
        store: &S,
        initial: &T,
        repair: ReadRepair,
    ) -> AsedexResult<(T, RepairOutcome)> {
        let key = kind.key();
        let stored = match store.get_item(key)? {
            Some(text) => Some(serde_json::from_str::<Value>(&text).map_err(|e| {
                AsedexError::Storage(format!("Failed to parse stored {}: {}", key, e))
            })?),
            None => None,
        };

        let mut settled = settle(kind, stored, initial)?;

        if settled.outcome.changed && repair == ReadRepair::WriteBack {
            match write_envelope(&*store, kind, &settled.envelope) {
                Ok(()) => {
                    settled.outcome.written = true;
                    debug!(
                        key,
                        from = settled.outcome.from_version,
                        to = settled.outcome.to_version,
                        "persisted migrated dataset"
                    );
                }
                Err(e) => warn!(key, operation = "open", error = %e, "failed to persist migrated dataset"),
            }
        }

        Ok((settled.value, settled.outcome))
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Why opening fell back to the initial value, if it did
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// What opening did to the stored data
    pub fn outcome(&self) -> Option<RepairOutcome> {
        self.outcome.read().ok().and_then(|outcome| *outcome)
    }

    /// A copy of the current value
    pub fn get(&self) -> AsedexResult<T> {
        self.with(Clone::clone)
    }

    /// Borrow the current value
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> AsedexResult<R> {
        let value = self
            .value
            .read()
            .map_err(|e| AsedexError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(f(&value))
    }

    /// Replace the value and persist it
    pub fn set(&self, value: T) -> AsedexResult<T> {
        self.update(move |_| value)
    }

    /// Compute the next value from the current one and persist it
    ///
    /// The in-memory value advances even when persisting fails.
    pub fn update<F>(&self, f: F) -> AsedexResult<T>
    where
        F: FnOnce(&T) -> T,
    {
        let next = {
            let mut current = self
                .value
                .write()
                .map_err(|e| AsedexError::Storage(format!("Failed to acquire write lock: {}", e)))?;
            let next = f(&current);
            *current = next.clone();
            next
        };
        self.persist_value(&next, "write")?;
        Ok(next)
    }

    /// Fallible read-modify-write: nothing changes when `f` fails
    pub fn try_update<R, F>(&self, f: F) -> AsedexResult<R>
    where
        F: FnOnce(&mut T) -> AsedexResult<R>,
    {
        let (next, result) = {
            let mut current = self
                .value
                .write()
                .map_err(|e| AsedexError::Storage(format!("Failed to acquire write lock: {}", e)))?;
            let mut next = current.clone();
            let result = f(&mut next)?;
            *current = next.clone();
            (next, result)
        };
        self.persist_value(&next, "write")?;
        Ok(result)
    }

    /// Write the current value to the medium, e.g. after a lazy repair
    pub fn persist(&self) -> AsedexResult<()> {
        let value = self.get()?;
        self.persist_value(&value, "persist")?;
        if let Ok(mut outcome) = self.outcome.write() {
            if let Some(outcome) = outcome.as_mut() {
                outcome.written = true;
            }
        }
        Ok(())
    }

    fn persist_value(&self, value: &T, operation: &'static str) -> AsedexResult<()> {
        let key = self.kind.key();
        let envelope = migrate(wrap_payload(self.kind, value)?, self.kind)?;
        write_envelope(&self.store, self.kind, &envelope).map_err(|e| {
            error!(key, operation, error = %e, "failed to persist dataset");
            e
        })?;
        debug!(key, operation, "dataset persisted");
        Ok(())
    }
}

fn write_envelope<S: TextStore + ?Sized>(store: &S, kind: DatasetKind, envelope: &Value) -> AsedexResult<()> {
    let text = serde_json::to_string_pretty(envelope)
        .map_err(|e| AsedexError::Storage(format!("Failed to serialize {}: {}", kind.key(), e)))?;
    store.set_item(kind.key(), &text)
}
