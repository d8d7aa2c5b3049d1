//! Export module for Asedex
//!
//! Exports a single budget, with its client name, line totals and grand
//! total, in multiple formats:
//! - CSV: spreadsheet-compatible lines plus a total row
//! - JSON: machine-readable, schema-versioned
//! - YAML: human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use csv::export_budget_csv;
pub use json::{export_budget_json, BudgetExport, ExportLine, EXPORT_SCHEMA_VERSION};
pub use yaml::export_budget_yaml;
