//! Client CLI commands
//!
//! Implements CLI commands for client management. Extra client fields are
//! given as `--field key=value`; an empty value removes the field.

use std::collections::BTreeMap;

use clap::Subcommand;
use serde_json::Value;

use crate::config::Settings;
use crate::display::client::{format_client_details, format_client_list};
use crate::error::{AsedexError, AsedexResult};
use crate::models::Client;
use crate::services::{AuthService, BudgetService, ClientPatch, ClientService};
use crate::storage::Storage;

/// Client subcommands
#[derive(Subcommand)]
pub enum ClientCommands {
    /// Add a client
    Add {
        /// Client name
        name: String,
        /// Extra field as key=value (repeatable)
        #[arg(short, long = "field")]
        fields: Vec<String>,
    },
    /// List all clients
    List,
    /// Show client details
    Show {
        /// Client name or ID
        client: String,
    },
    /// Edit a client
    Edit {
        /// Client name or ID
        client: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// Field to set as key=value, or remove with key= (repeatable)
        #[arg(short, long = "field")]
        fields: Vec<String>,
    },
    /// Delete a client (budgets are kept)
    Delete {
        /// Client name or ID
        client: String,
    },
}

impl ClientCommands {
    fn is_mutation(&self) -> bool {
        !matches!(self, Self::List | Self::Show { .. })
    }
}

/// Parse `key=value` pairs; values that are valid JSON keep their type
pub fn parse_fields(pairs: &[String]) -> AsedexResult<BTreeMap<String, Value>> {
    let mut fields = BTreeMap::new();

    for pair in pairs {
        let (key, raw) = pair.split_once('=').ok_or_else(|| {
            AsedexError::Validation(format!("Invalid field '{}'. Use key=value", pair))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(AsedexError::Validation(format!("Invalid field '{}': empty key", pair)));
        }

        let value = if raw.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        };
        fields.insert(key.to_string(), value);
    }

    Ok(fields)
}

fn find_client(service: &ClientService, identifier: &str) -> AsedexResult<Client> {
    service
        .find(identifier)?
        .ok_or_else(|| AsedexError::client_not_found(identifier))
}

/// Handle a client command
pub fn handle_client_command(storage: &Storage, settings: &Settings, cmd: ClientCommands) -> AsedexResult<()> {
    if cmd.is_mutation() {
        AuthService::new(storage, settings).require()?;
    }

    let service = ClientService::new(storage);

    match cmd {
        ClientCommands::Add { name, fields } => {
            let client = service.create(&name, parse_fields(&fields)?)?;
            println!("Created client: {}", client.name);
            println!("  ID: {}", client.id);
        }

        ClientCommands::List => {
            let clients = service.list()?;
            print!("{}", format_client_list(&clients));
        }

        ClientCommands::Show { client } => {
            let found = find_client(&service, &client)?;
            let budgets = BudgetService::new(storage).for_client(found.id)?;
            print!("{}", format_client_details(&found, budgets.len()));
        }

        ClientCommands::Edit { client, name, fields } => {
            let found = find_client(&service, &client)?;
            let patch = ClientPatch {
                name,
                fields: parse_fields(&fields)?,
            };

            if patch.is_empty() {
                println!("No changes specified. Use --name or --field key=value.");
                return Ok(());
            }

            let updated = service.update(found.id, patch)?;
            println!("Updated client: {}", updated.name);
        }

        ClientCommands::Delete { client } => {
            let found = find_client(&service, &client)?;
            let removed = service.delete(found.id)?;
            println!("Deleted client: {}", removed.name);
        }
    }

    Ok(())
}
