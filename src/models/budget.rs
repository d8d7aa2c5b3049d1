//! Budget (quote) model
//!
//! A budget is issued to one client on one date and lists module snapshots,
//! each carrying its own unit count. Lines are independent copies: editing or
//! deleting a catalog module never changes a saved budget.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetId, ClientId, ModuleId};
use super::module::Module;

/// A budget issued to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// Unique identifier
    pub id: BudgetId,

    /// Client the budget is issued to (not enforced)
    pub client_id: ClientId,

    /// Issue date
    pub date: NaiveDate,

    /// Module lines, in insertion order
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Budget {
    /// Create an empty budget
    pub fn new(id: BudgetId, client_id: ClientId, date: NaiveDate) -> Self {
        Self {
            id,
            client_id,
            date,
            modules: Vec::new(),
        }
    }

    /// Create an empty budget dated today
    pub fn today(id: BudgetId, client_id: ClientId) -> Self {
        Self::new(id, client_id, Local::now().date_naive())
    }

    /// Append a snapshot of a catalog module with one unit
    pub fn add_module(&mut self, module: &Module) {
        self.modules.push(module.snapshot());
    }

    /// Remove every line for a module; returns whether anything was removed
    pub fn remove_module(&mut self, module_id: ModuleId) -> bool {
        let before = self.modules.len();
        self.modules.retain(|line| line.id != module_id);
        self.modules.len() != before
    }

    /// Set the units of every line for a module, clamped to at least 1
    pub fn set_units(&mut self, module_id: ModuleId, units: i64) -> bool {
        let units = units.clamp(1, u32::MAX as i64) as u32;
        let mut found = false;
        for line in self.modules.iter_mut().filter(|line| line.id == module_id) {
            line.units = units;
            found = true;
        }
        found
    }

    pub fn line(&self, module_id: ModuleId) -> Option<&Module> {
        self.modules.iter().find(|line| line.id == module_id)
    }

    /// Sum of price times units over all lines
    pub fn total(&self) -> f64 {
        self.modules.iter().map(Module::line_total).sum()
    }

    /// Total number of units across lines
    pub fn unit_count(&self) -> u64 {
        self.modules.iter().map(|line| line.units as u64).sum()
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Budget {} ({})", self.id, self.date)
    }
}
