//! Display formatting for terminal output
//!
//! Provides utilities for formatting data models for terminal display as
//! tables and detail views.

pub mod budget;
pub mod client;
pub mod migration;
pub mod module;

pub use budget::{format_budget_details, format_budget_list};
pub use client::{format_client_details, format_client_list};
pub use migration::format_repair_report;
pub use module::{format_module_details, format_module_list};
