//! Directory-backed stores
//!
//! Each physical store is a directory; every key is a `<key>.json` file in it.
//! [`FileTextStore`] is the synchronous medium used by the command line,
//! [`FileStore`] the asynchronous one built on `tokio::fs`.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use super::file_io::{read_text, remove_if_exists, temp_path_for, write_text_atomic};
use super::store::{validate_key, Store, TextStore};
use crate::error::{AsedexError, AsedexResult};

/// Synchronous text store over a directory
#[derive(Debug, Clone)]
pub struct FileTextStore {
    dir: PathBuf,
}

impl FileTextStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// File holding the value of `key`
    pub fn path_for(&self, key: &str) -> AsedexResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl TextStore for FileTextStore {
    fn get_item(&self, key: &str) -> AsedexResult<Option<String>> {
        read_text(self.path_for(key)?)
    }

    fn set_item(&self, key: &str, value: &str) -> AsedexResult<()> {
        write_text_atomic(self.path_for(key)?, value)
    }

    fn remove_item(&self, key: &str) -> AsedexResult<()> {
        remove_if_exists(self.path_for(key)?)
    }
}

/// Asynchronous JSON store over a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> AsedexResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl Store for FileStore {
    async fn load(&self, key: &str) -> AsedexResult<Option<Value>> {
        let path = self.path_for(key)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AsedexError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| AsedexError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
    }

    async fn save(&self, key: &str, value: &Value) -> AsedexResult<()> {
        let path = self.path_for(key)?;
        let contents = serde_json::to_vec_pretty(value)
            .map_err(|e| AsedexError::Storage(format!("Failed to serialize data: {}", e)))?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AsedexError::Storage(format!(
                "Failed to create directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let temp_path = temp_path_for(&path);
        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AsedexError::Storage(format!("Failed to create temp file: {}", e)))?;
        file.write_all(&contents)
            .await
            .map_err(|e| AsedexError::Storage(format!("Failed to write data: {}", e)))?;
        file.sync_all()
            .await
            .map_err(|e| AsedexError::Storage(format!("Failed to sync data: {}", e)))?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(AsedexError::Storage(format!("Failed to rename temp file: {}", e)));
        }

        Ok(())
    }
}
