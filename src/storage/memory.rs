//! In-memory stores
//!
//! Useful for tests and for embedding the caches where nothing should touch
//! the filesystem.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use super::store::{Store, TextStore};
use crate::error::{AsedexError, AsedexResult};

/// Asynchronous store keeping JSON values in a map
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, bypassing any cache
    pub fn with_value(self, key: impl Into<String>, value: Value) -> Self {
        if let Ok(mut data) = self.data.write() {
            data.insert(key.into(), value);
        }
        self
    }

    /// Current raw value under `key`
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.data.read().ok().and_then(|data| data.get(key).cloned())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self, key: &str) -> AsedexResult<Option<Value>> {
        let data = self
            .data
            .read()
            .map_err(|e| AsedexError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &Value) -> AsedexResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| AsedexError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        data.insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// Synchronous string medium kept in memory
#[derive(Debug, Default)]
pub struct MemoryTextStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryTextStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextStore for MemoryTextStore {
    fn get_item(&self, key: &str) -> AsedexResult<Option<String>> {
        let items = self
            .items
            .read()
            .map_err(|e| AsedexError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AsedexResult<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| AsedexError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AsedexResult<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| AsedexError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        items.remove(key);
        Ok(())
    }
}
