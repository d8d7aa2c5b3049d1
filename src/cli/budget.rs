//! Budget CLI commands
//!
//! Implements CLI commands for budgets: creating them for a client, managing
//! their module lines and exporting them.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Subcommand;

use crate::cli::export::{export_budget, ExportFormat};
use crate::config::Settings;
use crate::display::budget::{format_budget_details, format_budget_list};
use crate::error::{AsedexError, AsedexResult};
use crate::models::{BudgetId, Client, ModuleId};
use crate::services::{AuthService, BudgetService, ClientService, ModuleService};
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Create a budget for a client
    New {
        /// Client name or ID
        client: String,
        /// Budget date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List budgets
    List {
        /// Only show budgets for this client
        #[arg(short, long)]
        client: Option<String>,
    },
    /// Show a budget with its lines and total
    Show {
        /// Budget ID
        budget: String,
    },
    /// Add a catalog module to a budget
    AddModule {
        /// Budget ID
        budget: String,
        /// Module title or ID
        module: String,
    },
    /// Remove a module from a budget
    RemoveModule {
        /// Budget ID
        budget: String,
        /// Module ID (or title of a catalog module)
        module: String,
    },
    /// Set the units of a budget line (minimum 1)
    Units {
        /// Budget ID
        budget: String,
        /// Module ID (or title of a catalog module)
        module: String,
        /// Number of units
        #[arg(allow_hyphen_values = true)]
        units: i64,
    },
    /// Change the client or date of a budget
    Edit {
        /// Budget ID
        budget: String,
        /// New client name or ID
        #[arg(short, long)]
        client: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Delete a budget
    Delete {
        /// Budget ID
        budget: String,
    },
    /// Export a budget to a file
    Export {
        /// Budget ID
        budget: String,
        /// Export format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,
        /// Output file ("-" for stdout; defaults to the exports directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl BudgetCommands {
    fn is_mutation(&self) -> bool {
        !matches!(self, Self::List { .. } | Self::Show { .. } | Self::Export { .. })
    }
}

fn parse_budget_id(raw: &str) -> AsedexResult<BudgetId> {
    raw.parse()
        .map_err(|_| AsedexError::Validation(format!("Invalid budget ID: '{}'", raw)))
}

fn parse_date(raw: &str) -> AsedexResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AsedexError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD", raw))
    })
}

fn find_client(storage: &Storage, identifier: &str) -> AsedexResult<Client> {
    ClientService::new(storage)
        .find(identifier)?
        .ok_or_else(|| AsedexError::client_not_found(identifier))
}

/// Resolve a module reference on a budget line: an ID, or a catalog title
fn resolve_line_module(storage: &Storage, identifier: &str) -> AsedexResult<ModuleId> {
    if let Ok(id) = identifier.parse::<ModuleId>() {
        return Ok(id);
    }
    ModuleService::new(storage)
        .find(identifier)?
        .map(|m| m.id)
        .ok_or_else(|| AsedexError::module_not_found(identifier))
}

/// Handle a budget command
pub fn handle_budget_command(storage: &Storage, settings: &Settings, cmd: BudgetCommands) -> AsedexResult<()> {
    if cmd.is_mutation() {
        AuthService::new(storage, settings).require()?;
    }

    let service = BudgetService::new(storage);

    match cmd {
        BudgetCommands::New { client, date } => {
            let client = find_client(storage, &client)?;
            let date = date.as_deref().map(parse_date).transpose()?;
            let budget = service.create(client.id, date)?;

            println!("Created budget {} for {}", budget.id, client.name);
            println!("  Date: {}", budget.date.format(&settings.date_format));
        }

        BudgetCommands::List { client } => {
            let budgets = match client {
                Some(client) => service.for_client(find_client(storage, &client)?.id)?,
                None => service.list()?,
            };
            let clients = ClientService::new(storage).list()?;
            print!("{}", format_budget_list(&budgets, &clients, settings));
        }

        BudgetCommands::Show { budget } => {
            let budget = service.require(parse_budget_id(&budget)?)?;
            let client = ClientService::new(storage).get(budget.client_id)?;
            print!("{}", format_budget_details(&budget, client.as_ref(), settings));
        }

        BudgetCommands::AddModule { budget, module } => {
            let id = parse_budget_id(&budget)?;
            let module = ModuleService::new(storage)
                .find(&module)?
                .ok_or_else(|| AsedexError::module_not_found(&module))?;
            let budget = service.add_module(id, module.id)?;

            println!("Added {} to budget {}", module.title, budget.id);
            println!("  Total: {}", settings.format_price(budget.total()));
        }

        BudgetCommands::RemoveModule { budget, module } => {
            let id = parse_budget_id(&budget)?;
            let module_id = resolve_line_module(storage, &module)?;
            let budget = service.remove_module(id, module_id)?;

            println!("Removed module {} from budget {}", module_id, budget.id);
            println!("  Total: {}", settings.format_price(budget.total()));
        }

        BudgetCommands::Units {
            budget,
            module,
            units,
        } => {
            let id = parse_budget_id(&budget)?;
            let module_id = resolve_line_module(storage, &module)?;
            let budget = service.set_units(id, module_id, units)?;
            let applied = budget.line(module_id).map(|line| line.units).unwrap_or(1);

            println!("Set {} unit(s) of module {} in budget {}", applied, module_id, budget.id);
            println!("  Total: {}", settings.format_price(budget.total()));
        }

        BudgetCommands::Edit { budget, client, date } => {
            let id = parse_budget_id(&budget)?;
            if client.is_none() && date.is_none() {
                println!("No changes specified. Use --client or --date.");
                return Ok(());
            }

            let client_id = match client {
                Some(client) => Some(find_client(storage, &client)?.id),
                None => None,
            };
            let date = date.as_deref().map(parse_date).transpose()?;

            let updated = service.update_header(id, client_id, date)?;
            println!("Updated budget {}", updated.id);
        }

        BudgetCommands::Delete { budget } => {
            let removed = service.delete(parse_budget_id(&budget)?)?;
            println!("Deleted budget {}", removed.id);
        }

        BudgetCommands::Export {
            budget,
            format,
            output,
        } => {
            let id = parse_budget_id(&budget)?;
            export_budget(storage, id, format, output)?;
        }
    }

    Ok(())
}
