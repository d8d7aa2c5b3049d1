//! Core data models for Asedex
//!
//! This module contains the data structures of the quoting domain: catalog
//! modules, clients, budgets and the login session.

pub mod auth;
pub mod budget;
pub mod client;
pub mod ids;
pub mod module;

pub use auth::AuthState;
pub use budget::Budget;
pub use client::{Client, ClientValidationError};
pub use ids::{BudgetId, ClientId, ModuleId};
pub use module::{Module, ModuleValidationError};
