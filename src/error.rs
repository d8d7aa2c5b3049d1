//! Custom error types for Asedex
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::migration::MigrationError;

/// The main error type for Asedex operations
#[derive(Error, Debug)]
pub enum AsedexError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Backing store errors (load/save failures)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A migration step rejected the stored data
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Login required or credentials rejected
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl AsedexError {
    /// Create a "not found" error for catalog modules
    pub fn module_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Module",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for clients
    pub fn client_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Client",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// No id is left above the largest stored one
    pub fn ids_exhausted(entity_type: &'static str) -> Self {
        Self::Storage(format!("{} ids exhausted: the largest stored id is {}", entity_type, i64::MAX))
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for AsedexError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AsedexError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Asedex operations
pub type AsedexResult<T> = Result<T, AsedexError>;
