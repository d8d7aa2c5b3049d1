//! YAML Export functionality
//!
//! Exports a budget to YAML for a human-readable copy.

use std::io::Write;

use crate::error::{AsedexError, AsedexResult};
use crate::export::json::BudgetExport;
use crate::models::BudgetId;
use crate::storage::Storage;

/// Export a budget to YAML
pub fn export_budget_yaml<W: Write>(storage: &Storage, id: BudgetId, writer: &mut W) -> AsedexResult<()> {
    let export = BudgetExport::from_storage(storage, id)?;

    writeln!(writer, "# Asedex budget {} for {}", export.budget_id, export.client_label())
        .map_err(|e| AsedexError::Export(e.to_string()))?;
    writeln!(writer, "# Generated: {}", export.exported_at)
        .map_err(|e| AsedexError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| AsedexError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| AsedexError::Export(e.to_string()))?;

    Ok(())
}
