//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod auth;
pub mod budget;
pub mod client;
pub mod export;
pub mod migrate;
pub mod module;

pub use auth::{handle_login, handle_logout, handle_whoami};
pub use budget::{handle_budget_command, BudgetCommands};
pub use client::{handle_client_command, ClientCommands};
pub use export::ExportFormat;
pub use migrate::handle_migrate_command;
pub use module::{handle_module_command, ModuleCommands};
