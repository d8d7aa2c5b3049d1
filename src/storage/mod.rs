//! Storage layer for Asedex
//!
//! Every dataset lives in its own physical store as a versioned envelope
//! `{ "version": N, "<key>": payload }`, brought up to date by the migration
//! engine whenever it is loaded or written.

pub mod cache;
pub mod envelope;
pub mod file_io;
pub mod file_store;
pub mod memory;
pub mod store;
pub mod sync_cache;

pub use cache::PersistentCache;
pub use envelope::RepairOutcome;
pub use file_store::{FileStore, FileTextStore};
pub use memory::{MemoryStore, MemoryTextStore};
pub use store::{Store, TextStore, TextStoreAdapter};
pub use sync_cache::SyncCache;

use std::sync::Arc;

use tracing::info;

use crate::config::{AsedexPaths, ReadRepair, Settings};
use crate::error::AsedexResult;
use crate::migration::DatasetKind;
use crate::models::{AuthState, Budget, Client, Module};

/// One store instance per dataset namespace
#[derive(Debug, Clone)]
pub struct StoreSet<S> {
    modules: S,
    clients: S,
    budgets: S,
    auth: S,
}

impl<S> StoreSet<S> {
    /// Build a set by creating one store per namespace
    pub fn build(mut make: impl FnMut(&'static str) -> S) -> Self {
        Self {
            modules: make(DatasetKind::Modules.namespace()),
            clients: make(DatasetKind::Clients.namespace()),
            budgets: make(DatasetKind::Budgets.namespace()),
            auth: make(DatasetKind::AuthState.namespace()),
        }
    }

    /// The store backing a dataset kind
    pub fn for_kind(&self, kind: DatasetKind) -> &S {
        match kind {
            DatasetKind::Modules => &self.modules,
            DatasetKind::Clients => &self.clients,
            DatasetKind::Budgets => &self.budgets,
            DatasetKind::AuthState => &self.auth,
        }
    }
}

impl StoreSet<FileTextStore> {
    /// Directory-backed stores under the data directory
    pub fn files(paths: &AsedexPaths) -> Self {
        Self::build(|namespace| FileTextStore::new(paths.store_dir(namespace)))
    }
}

impl StoreSet<Arc<MemoryTextStore>> {
    /// Independent in-memory stores
    pub fn memory() -> Self {
        Self::build(|_| Arc::new(MemoryTextStore::new()))
    }
}

/// Main storage coordinator holding one cache per dataset
pub struct Storage<S: TextStore = FileTextStore> {
    paths: AsedexPaths,
    pub modules: SyncCache<Vec<Module>, S>,
    pub clients: SyncCache<Vec<Client>, S>,
    pub budgets: SyncCache<Vec<Budget>, S>,
    pub auth: SyncCache<AuthState, S>,
}

impl Storage {
    /// Open every dataset from the data directory
    pub fn new(paths: AsedexPaths, settings: &Settings) -> AsedexResult<Self> {
        paths.ensure_directories()?;
        let stores = StoreSet::files(&paths);
        Self::with_stores(paths, stores, settings.read_repair)
    }
}

impl<S: TextStore + Clone> Storage<S> {
    /// Open every dataset from an explicit set of stores
    ///
    /// Unreadable or unmigratable data fails the open instead of being
    /// replaced by an empty dataset.
    pub fn with_stores(paths: AsedexPaths, stores: StoreSet<S>, repair: ReadRepair) -> AsedexResult<Self> {
        let open = |kind: DatasetKind| stores.for_kind(kind).clone();

        Ok(Self {
            modules: SyncCache::try_open(DatasetKind::Modules, open(DatasetKind::Modules), Vec::new(), repair)?,
            clients: SyncCache::try_open(DatasetKind::Clients, open(DatasetKind::Clients), Vec::new(), repair)?,
            budgets: SyncCache::try_open(DatasetKind::Budgets, open(DatasetKind::Budgets), Vec::new(), repair)?,
            auth: SyncCache::try_open(
                DatasetKind::AuthState,
                open(DatasetKind::AuthState),
                AuthState::default(),
                repair,
            )?,
            paths,
        })
    }
}

impl<S: TextStore> Storage<S> {
    /// Get the paths configuration
    pub fn paths(&self) -> &AsedexPaths {
        &self.paths
    }

    /// What opening did to each dataset
    pub fn outcomes(&self) -> Vec<RepairOutcome> {
        DatasetKind::all()
            .iter()
            .filter_map(|&kind| self.outcome(kind))
            .collect()
    }

    fn outcome(&self, kind: DatasetKind) -> Option<RepairOutcome> {
        match kind {
            DatasetKind::Modules => self.modules.outcome(),
            DatasetKind::Clients => self.clients.outcome(),
            DatasetKind::Budgets => self.budgets.outcome(),
            DatasetKind::AuthState => self.auth.outcome(),
        }
    }

    /// Persist one dataset in migrated form if opening left it pending
    pub fn repair(&self, kind: DatasetKind) -> AsedexResult<Option<RepairOutcome>> {
        let pending = self.outcome(kind).map(|o| o.is_pending()).unwrap_or(false);
        if pending {
            match kind {
                DatasetKind::Modules => self.modules.persist()?,
                DatasetKind::Clients => self.clients.persist()?,
                DatasetKind::Budgets => self.budgets.persist()?,
                DatasetKind::AuthState => self.auth.persist()?,
            }
            info!(key = kind.key(), operation = "repair", "dataset repaired");
        }
        Ok(self.outcome(kind))
    }

    /// Persist every dataset in migrated form and report version transitions
    pub fn repair_all(&self) -> AsedexResult<Vec<RepairOutcome>> {
        let mut outcomes = Vec::with_capacity(DatasetKind::all().len());
        for &kind in DatasetKind::all() {
            if let Some(outcome) = self.repair(kind)? {
                outcomes.push(outcome);
            }
        }
        Ok(outcomes)
    }

    /// Check if the settings file has been written
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}
