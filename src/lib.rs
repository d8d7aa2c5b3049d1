//! Asedex - module catalog, clients and budgets for elevator installations
//!
//! This library provides the core functionality for the Asedex budgeting
//! tool. Every dataset is persisted as a versioned JSON envelope and upgraded
//! by an ordered list of migration steps whenever it is loaded or written.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `migration`: Dataset kinds and their migration steps
//! - `models`: Core data models (modules, clients, budgets, login state)
//! - `storage`: Backing stores and the keyed persistence caches
//! - `services`: Business logic layer
//! - `export`: Budget export to CSV, JSON and YAML
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use asedex::config::{AsedexPaths, Settings};
//! use asedex::storage::Storage;
//!
//! let paths = AsedexPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths, &settings)?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod migration;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{AsedexError, AsedexResult};
