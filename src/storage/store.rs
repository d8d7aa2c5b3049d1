//! Backing store abstractions
//!
//! Two capabilities exist: [`Store`], an asynchronous store of JSON values, and
//! [`TextStore`], a synchronous string-keyed medium (in the spirit of a
//! browser's local storage). [`TextStoreAdapter`] lifts any `TextStore` into a
//! `Store`, so the asynchronous cache works over either medium.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AsedexError, AsedexResult};

/// Asynchronous key/value store holding JSON values
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch the value stored under `key`, if any
    async fn load(&self, key: &str) -> AsedexResult<Option<Value>>;

    /// Replace the value stored under `key`
    async fn save(&self, key: &str, value: &Value) -> AsedexResult<()>;
}

/// Synchronous string-keyed storage medium
pub trait TextStore: Send + Sync {
    fn get_item(&self, key: &str) -> AsedexResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> AsedexResult<()>;

    fn remove_item(&self, key: &str) -> AsedexResult<()>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn load(&self, key: &str) -> AsedexResult<Option<Value>> {
        (**self).load(key).await
    }

    async fn save(&self, key: &str, value: &Value) -> AsedexResult<()> {
        (**self).save(key, value).await
    }
}

impl<S: TextStore + ?Sized> TextStore for Arc<S> {
    fn get_item(&self, key: &str) -> AsedexResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> AsedexResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> AsedexResult<()> {
        (**self).remove_item(key)
    }
}

/// Exposes a synchronous text medium through the asynchronous [`Store`] interface
pub struct TextStoreAdapter<T> {
    inner: T,
}

impl<T: TextStore> TextStoreAdapter<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: TextStore> Store for TextStoreAdapter<T> {
    async fn load(&self, key: &str) -> AsedexResult<Option<Value>> {
        match self.inner.get_item(key)? {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| AsedexError::Storage(format!("Failed to parse {}: {}", key, e))),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, value: &Value) -> AsedexResult<()> {
        let text = serde_json::to_string(value)
            .map_err(|e| AsedexError::Storage(format!("Failed to serialize {}: {}", key, e)))?;
        self.inner.set_item(key, &text)
    }
}

/// Reject keys that could escape a store's namespace
pub(crate) fn validate_key(key: &str) -> AsedexResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AsedexError::Storage(format!("Invalid store key: {:?}", key)))
    }
}
