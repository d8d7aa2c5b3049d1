//! Store-backed keyed cache
//!
//! [`PersistentCache`] keeps the current value of one dataset in memory and
//! mirrors it to any number of subscribers. The first [`read`] loads the raw
//! value from the backing [`Store`], pushes it through the migration engine and,
//! depending on the [`ReadRepair`] policy, writes the migrated form back.
//! Writes update the in-memory value immediately and then persist it; the
//! caller observes its own write before the store has acknowledged it.
//!
//! Failures are logged with the dataset key and the operation, then returned.
//! A failed write does not roll back the in-memory value.
//!
//! [`read`]: PersistentCache::read

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, warn};

use super::envelope::{settle, stamp_latest, RepairOutcome};
use super::store::Store;
use crate::config::ReadRepair;
use crate::error::{AsedexError, AsedexResult};
use crate::migration::DatasetKind;

/// Keyed cache over an asynchronous store
pub struct PersistentCache<T, S> {
    kind: DatasetKind,
    store: S,
    initial: T,
    repair: ReadRepair,
    mirror: RwLock<T>,
    notify: watch::Sender<T>,
    activated: AtomicBool,
    writes: AtomicU64,
    outcome: RwLock<Option<RepairOutcome>>,
}

impl<T, S> PersistentCache<T, S>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
    S: Store,
{
    /// Create a cache; nothing is loaded until the first read
    pub fn new(kind: DatasetKind, store: S, initial: T, repair: ReadRepair) -> Self {
        let (notify, _) = watch::channel(initial.clone());
        Self {
            kind,
            store,
            mirror: RwLock::new(initial.clone()),
            initial,
            repair,
            notify,
            activated: AtomicBool::new(false),
            writes: AtomicU64::new(0),
            outcome: RwLock::new(None),
        }
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The in-memory value, without touching the store
    pub fn current(&self) -> AsedexResult<T> {
        let value = self
            .mirror
            .read()
            .map_err(|e| AsedexError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(value.clone())
    }

    /// Receive every value the cache takes on from now on
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.notify.subscribe()
    }

    /// What the first read did to the stored data, once it has happened
    pub fn outcome(&self) -> Option<RepairOutcome> {
        self.outcome.read().ok().and_then(|outcome| *outcome)
    }

    /// Current value, loading and migrating it from the store on first use
    pub async fn read(&self) -> AsedexResult<T> {
        if self.activated.load(Ordering::Acquire) {
            return self.current();
        }

        let key = self.kind.key();
        let writes_before = self.writes.load(Ordering::Acquire);

        let stored = self.store.load(key).await.map_err(|e| {
            error!(key, operation = "read", error = %e, "failed to load dataset");
            e
        })?;

        let mut settled = settle(self.kind, stored, &self.initial).map_err(|e| {
            error!(key, operation = "read", error = %e, "failed to migrate dataset");
            e
        })?;

        let raced = self.writes.load(Ordering::Acquire) != writes_before;

        if settled.outcome.changed && self.repair == ReadRepair::WriteBack && !raced {
            match self.store.save(key, &settled.envelope).await {
                Ok(()) => {
                    settled.outcome.written = true;
                    debug!(
                        key,
                        from = settled.outcome.from_version,
                        to = settled.outcome.to_version,
                        "persisted migrated dataset"
                    );
                }
                Err(e) => {
                    warn!(key, operation = "read", error = %e, "failed to persist migrated dataset")
                }
            }
        }

        if let Ok(mut outcome) = self.outcome.write() {
            *outcome = Some(settled.outcome);
        }

        // A write landed while loading; the mirror already holds newer data
        if raced || self.writes.load(Ordering::Acquire) != writes_before {
            self.activated.store(true, Ordering::Release);
            return self.current();
        }

        self.replace(settled.value.clone())?;
        self.activated.store(true, Ordering::Release);
        Ok(settled.value)
    }

    /// Replace the value and persist it
    ///
    /// The value does not depend on what is stored, so it is applied at once
    /// and wins over a first load that is still in flight.
    pub async fn write(&self, value: T) -> AsedexResult<T> {
        self.apply(move |_| value).await
    }

    /// Compute the next value from the in-memory value and persist it
    ///
    /// The first load completes before `f` runs, so `f` never sees the
    /// initial value in place of stored data. After that, `f` always sees the
    /// latest in-memory value, including writes whose store operation has not
    /// completed yet. A failed first load fails the update without change.
    pub async fn update<F>(&self, f: F) -> AsedexResult<T>
    where
        F: FnOnce(&T) -> T,
    {
        if !self.activated.load(Ordering::Acquire) {
            self.read().await?;
        }
        self.apply(f).await
    }

    async fn apply<F>(&self, f: F) -> AsedexResult<T>
    where
        F: FnOnce(&T) -> T,
    {
        let key = self.kind.key();
        let next = {
            let mut current = self.mirror.write().map_err(|e| {
                error!(key, operation = "write", error = %e, "cache mirror poisoned");
                AsedexError::Storage(format!("Failed to acquire write lock: {}", e))
            })?;
            let next = f(&current);
            *current = next.clone();
            self.notify.send_replace(next.clone());
            next
        };
        self.writes.fetch_add(1, Ordering::AcqRel);
        self.activated.store(true, Ordering::Release);

        let envelope = stamp_latest(self.kind, &next)?;
        self.store.save(key, &envelope).await.map_err(|e| {
            error!(key, operation = "write", error = %e, "failed to persist dataset");
            e
        })?;
        debug!(key, operation = "write", "dataset persisted");

        Ok(next)
    }

    fn replace(&self, value: T) -> AsedexResult<()> {
        let mut current = self
            .mirror
            .write()
            .map_err(|e| AsedexError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        *current = value.clone();
        self.notify.send_replace(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::migrate;
    use crate::models::{AuthState, Client, ClientId, Module};
    use crate::storage::memory::MemoryStore;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct TestStore {
        inner: MemoryStore,
        delay: Option<Duration>,
        fail_load: bool,
        fail_save: bool,
        saves: AtomicUsize,
    }

    impl TestStore {
        fn with(inner: MemoryStore) -> Self {
            Self {
                inner,
                ..Default::default()
            }
        }

        fn saves(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Store for TestStore {
        async fn load(&self, key: &str) -> AsedexResult<Option<Value>> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_load {
                return Err(AsedexError::Storage("store offline".into()));
            }
            self.inner.load(key).await
        }

        async fn save(&self, key: &str, value: &Value) -> AsedexResult<()> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_save {
                return Err(AsedexError::Storage("disk full".into()));
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(key, value).await
        }
    }

    fn client(id: i64, name: &str) -> Client {
        Client::new(ClientId::from_raw(id), name)
    }

    #[tokio::test]
    async fn test_first_read_synthesizes_and_persists() {
        let store = Arc::new(TestStore::default());
        let cache = PersistentCache::new(
            DatasetKind::Modules,
            store.clone(),
            Vec::<Module>::new(),
            ReadRepair::WriteBack,
        );

        assert!(cache.read().await.unwrap().is_empty());
        assert_eq!(
            store.inner.peek("modules"),
            Some(json!({ "version": 2, "modules": [] }))
        );
        assert_eq!(cache.outcome().unwrap().to_version, 2);
    }

    #[tokio::test]
    async fn test_legacy_data_is_healed_on_read() {
        let inner = MemoryStore::new().with_value("modules", json!([{ "id": 1, "title": "Cabin" }]));
        let store = Arc::new(TestStore::with(inner));
        let cache = PersistentCache::new(
            DatasetKind::Modules,
            store.clone(),
            Vec::<Module>::new(),
            ReadRepair::WriteBack,
        );

        let modules = cache.read().await.unwrap();
        assert_eq!(modules[0].title, "Cabin");
        assert_eq!(
            store.inner.peek("modules"),
            Some(json!({
                "version": 2,
                "modules": [{ "id": 1, "title": "Cabin", "imageData": "" }]
            }))
        );
        assert!(cache.outcome().unwrap().written);
    }

    #[tokio::test]
    async fn test_current_data_is_not_rewritten() {
        let inner = MemoryStore::new().with_value(
            "clients",
            json!({ "version": 1, "clients": [{ "id": 1, "name": "ACME" }] }),
        );
        let store = Arc::new(TestStore::with(inner));
        let cache =
            PersistentCache::new(DatasetKind::Clients, store.clone(), Vec::<Client>::new(), ReadRepair::WriteBack);

        cache.read().await.unwrap();
        cache.read().await.unwrap();
        assert_eq!(store.saves(), 0);
    }

    #[tokio::test]
    async fn test_lazy_policy_defers_repair() {
        let store = Arc::new(TestStore::default());
        let cache = PersistentCache::new(DatasetKind::Budgets, store.clone(), Vec::<Value>::new(), ReadRepair::Lazy);

        cache.read().await.unwrap();
        assert_eq!(store.saves(), 0);
        assert!(cache.outcome().unwrap().is_pending());

        cache.write(Vec::new()).await.unwrap();
        assert_eq!(store.inner.peek("budgets"), Some(json!({ "version": 1, "budgets": [] })));
    }

    #[tokio::test]
    async fn test_updates_chain_from_latest_value() {
        let store = Arc::new(TestStore {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let cache =
            PersistentCache::new(DatasetKind::Clients, store.clone(), Vec::<Client>::new(), ReadRepair::WriteBack);
        cache.read().await.unwrap();

        let (first, second) = tokio::join!(
            cache.update(|prev| {
                let mut next = prev.clone();
                next.push(client(1, "First"));
                next
            }),
            cache.update(|prev| {
                let mut next = prev.clone();
                next.push(client(2, "Second"));
                next
            }),
        );
        first.unwrap();
        second.unwrap();

        let names: Vec<String> = cache.current().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn test_write_visible_before_store_completes() {
        let store = Arc::new(TestStore {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        let cache = Arc::new(PersistentCache::new(
            DatasetKind::Clients,
            store.clone(),
            Vec::<Client>::new(),
            ReadRepair::Lazy,
        ));

        let writer = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.write(vec![client(1, "ACME")]).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(cache.current().unwrap().len(), 1);
        assert_eq!(store.inner.peek("clients"), None);

        writer.await.unwrap().unwrap();
        assert!(store.inner.peek("clients").is_some());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_mirror() {
        let store = TestStore {
            fail_save: true,
            ..Default::default()
        };
        let cache = PersistentCache::new(DatasetKind::Clients, store, Vec::<Client>::new(), ReadRepair::WriteBack);

        // Read succeeds even though the repair write fails
        assert!(cache.read().await.unwrap().is_empty());

        let err = cache.write(vec![client(1, "ACME")]).await.unwrap_err();
        assert!(matches!(err, AsedexError::Storage(_)));
        assert_eq!(cache.current().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_initial() {
        let store = TestStore {
            fail_load: true,
            ..Default::default()
        };
        let cache = PersistentCache::new(
            DatasetKind::AuthState,
            store,
            AuthState::default(),
            ReadRepair::WriteBack,
        );

        assert!(cache.read().await.is_err());
        assert_eq!(cache.current().unwrap(), AuthState::default());
    }

    #[tokio::test]
    async fn test_migration_failure_propagates() {
        let inner = MemoryStore::new().with_value("modules", json!({ "modules": [17] }));
        let cache = PersistentCache::new(
            DatasetKind::Modules,
            TestStore::with(inner),
            Vec::<Module>::new(),
            ReadRepair::WriteBack,
        );

        assert!(matches!(cache.read().await, Err(AsedexError::Migration(_))));
    }

    #[tokio::test]
    async fn test_subscribers_see_loads_and_writes() {
        let inner = MemoryStore::new().with_value(
            "clients",
            json!({ "version": 1, "clients": [{ "id": 1, "name": "ACME" }] }),
        );
        let cache = PersistentCache::new(
            DatasetKind::Clients,
            TestStore::with(inner),
            Vec::<Client>::new(),
            ReadRepair::WriteBack,
        );
        let mut rx = cache.subscribe();

        cache.read().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        cache.write(Vec::new()).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_write_during_first_load_wins() {
        let store = Arc::new(TestStore {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let cache =
            PersistentCache::new(DatasetKind::Clients, store.clone(), Vec::<Client>::new(), ReadRepair::WriteBack);

        let (read, write) = tokio::join!(cache.read(), cache.write(vec![client(9, "Early")]));
        write.unwrap();
        assert_eq!(read.unwrap()[0].name, "Early");
        assert_eq!(cache.current().unwrap()[0].name, "Early");
    }

    #[tokio::test]
    async fn test_update_before_read_keeps_stored_records() {
        let inner = MemoryStore::new().with_value(
            "clients",
            json!({ "version": 1, "clients": [{ "id": 1, "name": "ACME" }] }),
        );
        let store = Arc::new(TestStore {
            inner,
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let cache =
            PersistentCache::new(DatasetKind::Clients, store.clone(), Vec::<Client>::new(), ReadRepair::WriteBack);

        let (read, updated) = tokio::join!(
            cache.read(),
            cache.update(|prev| {
                let mut next = prev.clone();
                next.push(client(2, "Second"));
                next
            }),
        );
        read.unwrap();
        let names: Vec<String> = updated.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["ACME", "Second"]);

        let stored = store.inner.peek("clients").unwrap();
        assert_eq!(stored["clients"].as_array().unwrap().len(), 2);
        assert_eq!(cache.current().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_fails_when_first_load_fails() {
        let store = TestStore {
            fail_load: true,
            ..Default::default()
        };
        let cache = PersistentCache::new(DatasetKind::Clients, store, Vec::<Client>::new(), ReadRepair::WriteBack);

        let result = cache
            .update(|prev| {
                let mut next = prev.clone();
                next.push(client(1, "Lost"));
                next
            })
            .await;
        assert!(result.is_err());
        assert!(cache.current().unwrap().is_empty());
        assert_eq!(cache.store().saves(), 0);
    }

    #[tokio::test]
    async fn test_write_then_read_matches_migration() {
        let cache = PersistentCache::new(
            DatasetKind::Modules,
            MemoryStore::new(),
            Vec::<Module>::new(),
            ReadRepair::WriteBack,
        );
        let module = Module::new(crate::models::ModuleId::from_raw(4), "Doors", "Access", 800.0);
        cache.write(vec![module.clone()]).await.unwrap();

        let read = cache.read().await.unwrap();
        let expected = migrate(json!({ "modules": [module] }), DatasetKind::Modules).unwrap();
        assert_eq!(serde_json::to_value(&read).unwrap(), expected["modules"]);
    }
}
