//! Client model
//!
//! Clients only require a name; every other field (phone, address, tax id...)
//! is free-form and carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::ids::ClientId;

/// A client that budgets are issued to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier
    pub id: ClientId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Any additional fields
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Client {
    /// Create a new client
    pub fn new(id: ClientId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a free-form field; `null` removes it
    pub fn set_field(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if value.is_null() {
            self.fields.remove(&key);
        } else {
            self.fields.insert(key, value);
        }
    }

    /// Field value rendered for display
    pub fn field_text(&self, key: &str) -> Option<String> {
        self.fields.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Case-insensitive name comparison
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }

    /// Validate the client
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.name.trim().is_empty() {
            return Err(ClientValidationError::EmptyName);
        }
        if self.fields.contains_key("id") || self.fields.contains_key("name") {
            return Err(ClientValidationError::ReservedField);
        }
        Ok(())
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientValidationError {
    EmptyName,
    ReservedField,
}

impl fmt::Display for ClientValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Client name cannot be empty"),
            Self::ReservedField => write!(f, "Fields 'id' and 'name' cannot be set as extra fields"),
        }
    }
}

impl std::error::Error for ClientValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extra_fields_flattened() {
        let mut client = Client::new(ClientId::from_raw(5), "Comunidad Calle Mayor 3");
        client.set_field("phone", json!("600 000 000"));

        let value = serde_json::to_value(&client).unwrap();
        assert_eq!(
            value,
            json!({ "id": 5, "name": "Comunidad Calle Mayor 3", "phone": "600 000 000" })
        );

        let back: Client = serde_json::from_value(value).unwrap();
        assert_eq!(back, client);
    }

    #[test]
    fn test_null_removes_field() {
        let mut client = Client::new(ClientId::from_raw(5), "ACME");
        client.set_field("phone", json!("1"));
        client.set_field("phone", Value::Null);
        assert!(client.fields.is_empty());
    }

    #[test]
    fn test_field_text() {
        let mut client = Client::new(ClientId::from_raw(5), "ACME");
        client.set_field("floors", json!(7));
        assert_eq!(client.field_text("floors").as_deref(), Some("7"));
        assert_eq!(client.field_text("missing"), None);
    }

    #[test]
    fn test_validation() {
        let mut client = Client::new(ClientId::from_raw(1), "");
        assert_eq!(client.validate(), Err(ClientValidationError::EmptyName));
        client.name = "ACME".into();
        assert!(client.validate().is_ok());
        assert!(client.matches_name("acme "));
    }
}
