//! Configuration module for Asedex
//!
//! This module provides configuration management including:
//! - Data directory resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::AsedexPaths;
pub use settings::{ReadRepair, Settings};
