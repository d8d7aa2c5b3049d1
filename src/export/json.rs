//! JSON Export functionality
//!
//! Exports a single budget, resolved against its client, with schema versioning.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::{AsedexError, AsedexResult};
use crate::models::{BudgetId, ClientId, ModuleId};
use crate::services::{BudgetService, ClientService};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// A budget as handed to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub budget_id: BudgetId,
    pub date: NaiveDate,
    pub client_id: ClientId,

    /// Client name, or `None` if the client has since been deleted
    pub client_name: Option<String>,

    pub lines: Vec<ExportLine>,

    /// Sum of all line totals
    pub total: f64,
}

/// One budget line with its computed total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportLine {
    pub module_id: ModuleId,
    pub title: String,
    pub category: String,
    pub unit_price: f64,
    pub units: u32,
    pub line_total: f64,
}

impl BudgetExport {
    /// Build the export of a stored budget
    pub fn from_storage(storage: &Storage, id: BudgetId) -> AsedexResult<Self> {
        let budget = BudgetService::new(storage).require(id)?;
        let client_name = ClientService::new(storage)
            .get(budget.client_id)?
            .map(|c| c.name);

        let lines = budget
            .modules
            .iter()
            .map(|line| ExportLine {
                module_id: line.id,
                title: line.title.clone(),
                category: line.category.clone(),
                unit_price: line.price,
                units: line.units,
                line_total: line.line_total(),
            })
            .collect();

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            budget_id: budget.id,
            date: budget.date,
            client_id: budget.client_id,
            client_name,
            lines,
            total: budget.total(),
        })
    }

    /// Client name for display, falling back to the raw id
    pub fn client_label(&self) -> String {
        self.client_name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.client_id))
    }
}

/// Export a budget to pretty-printed JSON
pub fn export_budget_json<W: Write>(storage: &Storage, id: BudgetId, writer: &mut W) -> AsedexResult<()> {
    let export = BudgetExport::from_storage(storage, id)?;

    serde_json::to_writer_pretty(&mut *writer, &export)
        .map_err(|e| AsedexError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| AsedexError::Export(e.to_string()))?;

    Ok(())
}
