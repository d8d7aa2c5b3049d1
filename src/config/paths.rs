//! Path management for Asedex
//!
//! Provides path resolution for settings, per-dataset stores, uploads and exports.
//!
//! ## Path Resolution Order
//!
//! 1. `ASEDEX_DATA_DIR` environment variable (if set)
//! 2. The platform data directory (`~/.local/share/asedex` on Linux,
//!    `~/Library/Application Support/com.asedex.asedex` on macOS,
//!    `%APPDATA%\asedex\asedex\data` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::AsedexError;

/// Manages all paths used by Asedex
#[derive(Debug, Clone)]
pub struct AsedexPaths {
    /// Base directory for all Asedex data
    base_dir: PathBuf,
}

impl AsedexPaths {
    /// Create a new AsedexPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, AsedexError> {
        let base_dir = if let Ok(custom) = std::env::var("ASEDEX_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("com", "asedex", "asedex")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| {
                    AsedexError::Config("Could not determine a home directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create AsedexPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding one sub-directory per physical store
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Directory of the physical store for a namespace (`modules`, `auth`, ...)
    pub fn store_dir(&self, namespace: &str) -> PathBuf {
        self.data_dir().join(namespace)
    }

    /// Where attached module images are copied
    pub fn uploads_dir(&self) -> PathBuf {
        self.base_dir.join("uploads")
    }

    /// Default destination for budget exports
    pub fn exports_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), AsedexError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| AsedexError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| AsedexError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.uploads_dir())
            .map_err(|e| AsedexError::Io(format!("Failed to create uploads directory: {}", e)))?;

        Ok(())
    }

    /// Check if Asedex has been configured (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AsedexPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(
            paths.store_dir("auth"),
            temp_dir.path().join("data").join("auth")
        );
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        env::set_var("ASEDEX_DATA_DIR", custom_path);

        let paths = AsedexPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());

        env::remove_var("ASEDEX_DATA_DIR");
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AsedexPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.uploads_dir().exists());
        assert!(!paths.is_initialized());
    }
}
