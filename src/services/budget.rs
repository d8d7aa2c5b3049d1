//! Budget service
//!
//! Provides business logic for budgets (quotes): creating them for a client,
//! adding catalog modules as independent line snapshots, adjusting units and
//! computing totals.

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::error::{AsedexError, AsedexResult};
use crate::models::{Budget, BudgetId, ClientId, ModuleId};
use crate::storage::Storage;

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create an empty budget for a client, dated today unless given
    pub fn create(&self, client_id: ClientId, date: Option<NaiveDate>) -> AsedexResult<Budget> {
        self.ensure_client(client_id)?;
        let date = date.unwrap_or_else(|| Local::now().date_naive());

        let budget = self.storage.budgets.try_update(|budgets| {
            let last = budgets.iter().map(|b| b.id).max();
            let id = BudgetId::next_after(last).ok_or_else(|| AsedexError::ids_exhausted("Budget"))?;
            let budget = Budget::new(id, client_id, date);
            budgets.push(budget.clone());
            Ok(budget)
        })?;

        info!(key = "budgets", operation = "create", id = %budget.id, "budget created");
        Ok(budget)
    }

    /// Get a budget by ID
    pub fn get(&self, id: BudgetId) -> AsedexResult<Option<Budget>> {
        self.storage
            .budgets
            .with(|budgets| budgets.iter().find(|b| b.id == id).cloned())
    }

    /// Get a budget by ID, failing if it doesn't exist
    pub fn require(&self, id: BudgetId) -> AsedexResult<Budget> {
        self.get(id)?
            .ok_or_else(|| AsedexError::budget_not_found(id.to_string()))
    }

    /// List all budgets, newest first
    pub fn list(&self) -> AsedexResult<Vec<Budget>> {
        let mut budgets = self.storage.budgets.get()?;
        budgets.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(budgets)
    }

    /// Budgets issued to a client, newest first
    pub fn for_client(&self, client_id: ClientId) -> AsedexResult<Vec<Budget>> {
        let mut budgets = self.list()?;
        budgets.retain(|b| b.client_id == client_id);
        Ok(budgets)
    }

    /// Add a snapshot of a catalog module with one unit
    pub fn add_module(&self, id: BudgetId, module_id: ModuleId) -> AsedexResult<Budget> {
        let module = self
            .storage
            .modules
            .with(|modules| modules.iter().find(|m| m.id == module_id).cloned())?
            .ok_or_else(|| AsedexError::module_not_found(module_id.to_string()))?;

        let budget = self.modify(id, |budget| {
            budget.add_module(&module);
            Ok(())
        })?;

        info!(key = "budgets", operation = "add_module", id = %id, module = %module_id, "module added to budget");
        Ok(budget)
    }

    /// Remove every line for a module
    pub fn remove_module(&self, id: BudgetId, module_id: ModuleId) -> AsedexResult<Budget> {
        let budget = self.modify(id, |budget| {
            if budget.remove_module(module_id) {
                Ok(())
            } else {
                Err(line_not_found(module_id))
            }
        })?;

        info!(key = "budgets", operation = "remove_module", id = %id, module = %module_id, "module removed from budget");
        Ok(budget)
    }

    /// Set the units of a line; values below 1 become 1
    pub fn set_units(&self, id: BudgetId, module_id: ModuleId, units: i64) -> AsedexResult<Budget> {
        let budget = self.modify(id, |budget| {
            if budget.set_units(module_id, units) {
                Ok(())
            } else {
                Err(line_not_found(module_id))
            }
        })?;

        info!(key = "budgets", operation = "set_units", id = %id, module = %module_id, units, "units updated");
        Ok(budget)
    }

    /// Change the client and/or date of a budget
    pub fn update_header(
        &self,
        id: BudgetId,
        client_id: Option<ClientId>,
        date: Option<NaiveDate>,
    ) -> AsedexResult<Budget> {
        if let Some(client_id) = client_id {
            self.ensure_client(client_id)?;
        }

        let budget = self.modify(id, |budget| {
            if let Some(client_id) = client_id {
                budget.client_id = client_id;
            }
            if let Some(date) = date {
                budget.date = date;
            }
            Ok(())
        })?;

        info!(key = "budgets", operation = "update", id = %id, "budget updated");
        Ok(budget)
    }

    /// Delete a budget
    pub fn delete(&self, id: BudgetId) -> AsedexResult<Budget> {
        let removed = self.storage.budgets.try_update(|budgets| {
            let index = budgets
                .iter()
                .position(|b| b.id == id)
                .ok_or_else(|| AsedexError::budget_not_found(id.to_string()))?;
            Ok(budgets.remove(index))
        })?;

        info!(key = "budgets", operation = "delete", id = %id, "budget deleted");
        Ok(removed)
    }

    /// Sum of price times units over the budget's lines
    pub fn total(&self, id: BudgetId) -> AsedexResult<f64> {
        Ok(self.require(id)?.total())
    }

    fn modify<F>(&self, id: BudgetId, f: F) -> AsedexResult<Budget>
    where
        F: FnOnce(&mut Budget) -> AsedexResult<()>,
    {
        self.storage.budgets.try_update(|budgets| {
            let budget = budgets
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| AsedexError::budget_not_found(id.to_string()))?;
            f(budget)?;
            Ok(budget.clone())
        })
    }

    fn ensure_client(&self, client_id: ClientId) -> AsedexResult<()> {
        let exists = self
            .storage
            .clients
            .with(|clients| clients.iter().any(|c| c.id == client_id))?;
        if exists {
            Ok(())
        } else {
            Err(AsedexError::client_not_found(client_id.to_string()))
        }
    }
}

fn line_not_found(module_id: ModuleId) -> AsedexError {
    AsedexError::NotFound {
        entity_type: "Budget line",
        identifier: module_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AsedexPaths, Settings};
    use crate::models::{Client, Module};
    use crate::services::{ClientService, ModulePatch, ModuleService, NewModule};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = AsedexPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths, &Settings::default()).unwrap();
        (temp_dir, storage)
    }

    fn setup(storage: &Storage) -> (Client, Module, Module) {
        let client = ClientService::new(storage)
            .create("ACME", BTreeMap::new())
            .unwrap();
        let modules = ModuleService::new(storage);
        let cabin = modules
            .create(NewModule {
                title: "Cabin".into(),
                category: "Structure".into(),
                price: 100.0,
                ..Default::default()
            })
            .unwrap();
        let motor = modules
            .create(NewModule {
                title: "Motor".into(),
                category: "Drive".into(),
                price: 250.5,
                ..Default::default()
            })
            .unwrap();
        (client, cabin, motor)
    }

    #[test]
    fn test_create_budget() {
        let (_temp_dir, storage) = create_test_storage();
        let (client, _, _) = setup(&storage);
        let service = BudgetService::new(&storage);

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let budget = service.create(client.id, Some(date)).unwrap();
        assert_eq!(budget.client_id, client.id);
        assert_eq!(budget.date, date);
        assert!(budget.modules.is_empty());
    }

    #[test]
    fn test_create_requires_known_client() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        let result = service.create(ClientId::from_raw(1), None);
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_add_module_and_total() {
        let (_temp_dir, storage) = create_test_storage();
        let (client, cabin, motor) = setup(&storage);
        let service = BudgetService::new(&storage);
        let budget = service.create(client.id, None).unwrap();

        service.add_module(budget.id, cabin.id).unwrap();
        let budget = service.add_module(budget.id, motor.id).unwrap();
        assert_eq!(budget.modules.len(), 2);
        assert!(budget.modules.iter().all(|line| line.units == 1));

        let budget = service.set_units(budget.id, cabin.id, 3).unwrap();
        assert_eq!(budget.line(cabin.id).unwrap().units, 3);
        assert!((service.total(budget.id).unwrap() - 550.5).abs() < 1e-9);
    }

    #[test]
    fn test_set_units_clamps_to_one() {
        let (_temp_dir, storage) = create_test_storage();
        let (client, cabin, _) = setup(&storage);
        let service = BudgetService::new(&storage);
        let budget = service.create(client.id, None).unwrap();
        service.add_module(budget.id, cabin.id).unwrap();

        let budget = service.set_units(budget.id, cabin.id, -4).unwrap();
        assert_eq!(budget.line(cabin.id).unwrap().units, 1);
    }

    #[test]
    fn test_remove_module() {
        let (_temp_dir, storage) = create_test_storage();
        let (client, cabin, motor) = setup(&storage);
        let service = BudgetService::new(&storage);
        let budget = service.create(client.id, None).unwrap();
        service.add_module(budget.id, cabin.id).unwrap();
        service.add_module(budget.id, motor.id).unwrap();

        let budget = service.remove_module(budget.id, cabin.id).unwrap();
        assert_eq!(budget.modules.len(), 1);
        assert_eq!(budget.modules[0].id, motor.id);
        assert!(service.remove_module(budget.id, cabin.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_lines_are_snapshots() {
        let (_temp_dir, storage) = create_test_storage();
        let (client, cabin, _) = setup(&storage);
        let service = BudgetService::new(&storage);
        let budget = service.create(client.id, None).unwrap();
        service.add_module(budget.id, cabin.id).unwrap();

        let modules = ModuleService::new(&storage);
        modules
            .update(
                cabin.id,
                ModulePatch {
                    price: Some(999.0),
                    ..Default::default()
                },
            )
            .unwrap();
        modules.delete(cabin.id).unwrap();

        let budget = service.require(budget.id).unwrap();
        assert_eq!(budget.line(cabin.id).unwrap().price, 100.0);
    }

    #[test]
    fn test_update_header() {
        let (_temp_dir, storage) = create_test_storage();
        let (client, _, _) = setup(&storage);
        let other = ClientService::new(&storage)
            .create("Other", BTreeMap::new())
            .unwrap();
        let service = BudgetService::new(&storage);
        let budget = service.create(client.id, None).unwrap();

        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let updated = service.update_header(budget.id, Some(other.id), Some(date)).unwrap();
        assert_eq!(updated.client_id, other.id);
        assert_eq!(updated.date, date);

        let result = service.update_header(budget.id, Some(ClientId::from_raw(7)), None);
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_for_client_and_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let (client, _, _) = setup(&storage);
        let service = BudgetService::new(&storage);
        let first = service.create(client.id, None).unwrap();
        service.create(client.id, None).unwrap();

        assert_eq!(service.for_client(client.id).unwrap().len(), 2);

        service.delete(first.id).unwrap();
        assert_eq!(service.for_client(client.id).unwrap().len(), 1);
        assert!(service.get(first.id).unwrap().is_none());
    }

    #[test]
    fn test_client_delete_does_not_cascade() {
        let (_temp_dir, storage) = create_test_storage();
        let (client, _, _) = setup(&storage);
        let service = BudgetService::new(&storage);
        let budget = service.create(client.id, None).unwrap();

        ClientService::new(&storage).delete(client.id).unwrap();
        assert_eq!(service.require(budget.id).unwrap().client_id, client.id);
    }
}
