//! User settings for Asedex
//!
//! Manages preferences including the currency symbol, the login gate
//! credentials, and how the keyed caches repair legacy data on read.

use serde::{Deserialize, Serialize};

use super::paths::AsedexPaths;
use crate::error::AsedexError;

/// What a cache does when a read had to migrate stored data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReadRepair {
    /// Persist the migrated form immediately (self-healing read)
    #[default]
    WriteBack,
    /// Keep the migrated form in memory only; it reaches the store on the next write
    Lazy,
}

/// User settings for Asedex
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when printing prices
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Read-repair policy for the keyed caches
    #[serde(default)]
    pub read_repair: ReadRepair,

    /// Whether mutating commands require a logged-in session
    #[serde(default = "default_require_login")]
    pub require_login: bool,

    /// Username accepted by the login gate
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    /// Password accepted by the login gate
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "€".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_require_login() -> bool {
    true
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "1234".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            read_repair: ReadRepair::default(),
            require_login: default_require_login(),
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &AsedexPaths) -> Result<Self, AsedexError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| AsedexError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| AsedexError::Config(format!("Failed to parse settings file: {}", e)))?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AsedexPaths) -> Result<(), AsedexError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AsedexError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| AsedexError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Format a price with the configured currency symbol
    pub fn format_price(&self, amount: f64) -> String {
        format!("{:.2} {}", amount, self.currency_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.read_repair, ReadRepair::WriteBack);
        assert!(settings.require_login);
        assert_eq!(settings.admin_username, "admin");
        assert_eq!(settings.admin_password, "1234");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AsedexPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.read_repair = ReadRepair::Lazy;
        settings.require_login = false;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.read_repair, ReadRepair::Lazy);
        assert!(!loaded.require_login);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"read_repair":"lazy"}"#).unwrap();
        assert_eq!(settings.read_repair, ReadRepair::Lazy);
        assert_eq!(settings.currency_symbol, "€");
        assert!(settings.require_login);
    }

    #[test]
    fn test_format_price() {
        let settings = Settings::default();
        assert_eq!(settings.format_price(1250.5), "1250.50 €");
    }
}
