//! Client service
//!
//! Provides business logic for client management. Apart from the name, client
//! fields are free-form and merged key by key on update.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::info;

use crate::error::{AsedexError, AsedexResult};
use crate::models::{Client, ClientId};
use crate::storage::Storage;

/// Partial update of a client
///
/// A `null` field value removes that field.
#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub fields: BTreeMap<String, Value>,
}

impl ClientPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.fields.is_empty()
    }
}

/// Service for client management
pub struct ClientService<'a> {
    storage: &'a Storage,
}

impl<'a> ClientService<'a> {
    /// Create a new client service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new client
    pub fn create(&self, name: &str, fields: BTreeMap<String, Value>) -> AsedexResult<Client> {
        let client = self.storage.clients.try_update(|clients| {
            let last = clients.iter().map(|c| c.id).max();
            let id = ClientId::next_after(last).ok_or_else(|| AsedexError::ids_exhausted("Client"))?;
            let mut client = Client::new(id, name.trim());
            for (key, value) in fields {
                client.set_field(key, value);
            }

            client
                .validate()
                .map_err(|e| AsedexError::Validation(e.to_string()))?;

            clients.push(client.clone());
            Ok(client)
        })?;

        info!(key = "clients", operation = "create", id = %client.id, "client created");
        Ok(client)
    }

    /// Get a client by ID
    pub fn get(&self, id: ClientId) -> AsedexResult<Option<Client>> {
        self.storage
            .clients
            .with(|clients| clients.iter().find(|c| c.id == id).cloned())
    }

    /// Find a client by ID or name (case-insensitive)
    pub fn find(&self, identifier: &str) -> AsedexResult<Option<Client>> {
        if let Ok(id) = identifier.parse::<ClientId>() {
            if let Some(client) = self.get(id)? {
                return Ok(Some(client));
            }
        }

        self.storage
            .clients
            .with(|clients| clients.iter().find(|c| c.matches_name(identifier)).cloned())
    }

    /// List all clients sorted by name
    pub fn list(&self) -> AsedexResult<Vec<Client>> {
        let mut clients = self.storage.clients.get()?;
        clients.sort_by_key(|c| c.name.to_lowercase());
        Ok(clients)
    }

    /// Merge a patch into a client
    pub fn update(&self, id: ClientId, patch: ClientPatch) -> AsedexResult<Client> {
        let client = self.storage.clients.try_update(|clients| {
            let client = clients
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| AsedexError::client_not_found(id.to_string()))?;

            let mut updated = client.clone();
            if let Some(name) = patch.name {
                updated.name = name.trim().to_string();
            }
            for (key, value) in patch.fields {
                updated.set_field(key, value);
            }

            updated
                .validate()
                .map_err(|e| AsedexError::Validation(e.to_string()))?;

            *client = updated.clone();
            Ok(updated)
        })?;

        info!(key = "clients", operation = "update", id = %client.id, "client updated");
        Ok(client)
    }

    /// Delete a client
    ///
    /// Budgets issued to the client are left in place.
    pub fn delete(&self, id: ClientId) -> AsedexResult<Client> {
        let removed = self.storage.clients.try_update(|clients| {
            let index = clients
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| AsedexError::client_not_found(id.to_string()))?;
            Ok(clients.remove(index))
        })?;

        info!(key = "clients", operation = "delete", id = %removed.id, "client deleted");
        Ok(removed)
    }
}
