//! Module CLI commands
//!
//! Implements CLI commands for the module catalog.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::Settings;
use crate::display::module::{format_module_details, format_module_list};
use crate::error::{AsedexError, AsedexResult};
use crate::models::Module;
use crate::services::{AuthService, ModulePatch, ModuleService, NewModule};
use crate::storage::Storage;

/// Module subcommands
#[derive(Subcommand)]
pub enum ModuleCommands {
    /// Add a module to the catalog
    Add {
        /// Module title
        title: String,
        /// Unit price (e.g., "1200" or "1200.50")
        #[arg(short, long)]
        price: f64,
        /// Category
        #[arg(short, long, default_value = "")]
        category: String,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List catalog modules
    List {
        /// Only show modules in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show module details
    Show {
        /// Module title or ID
        module: String,
    },
    /// Edit a module
    Edit {
        /// Module title or ID
        module: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New unit price
        #[arg(short, long)]
        price: Option<f64>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a module from the catalog
    Delete {
        /// Module title or ID
        module: String,
    },
    /// Attach an image to a module
    Image {
        /// Module title or ID
        module: String,
        /// Image file to upload
        file: PathBuf,
    },
}

impl ModuleCommands {
    fn is_mutation(&self) -> bool {
        !matches!(self, Self::List { .. } | Self::Show { .. })
    }
}

fn find_module(service: &ModuleService, identifier: &str) -> AsedexResult<Module> {
    service
        .find(identifier)?
        .ok_or_else(|| AsedexError::module_not_found(identifier))
}

/// Handle a module command
pub fn handle_module_command(storage: &Storage, settings: &Settings, cmd: ModuleCommands) -> AsedexResult<()> {
    if cmd.is_mutation() {
        AuthService::new(storage, settings).require()?;
    }

    let service = ModuleService::new(storage);

    match cmd {
        ModuleCommands::Add {
            title,
            price,
            category,
            description,
        } => {
            let module = service.create(NewModule {
                title,
                description,
                category,
                price,
            })?;

            println!("Created module: {}", module.title);
            println!("  Price: {}", settings.format_price(module.price));
            println!("  ID: {}", module.id);
        }

        ModuleCommands::List { category } => {
            let modules = service.list(category.as_deref())?;
            print!("{}", format_module_list(&modules, settings));
        }

        ModuleCommands::Show { module } => {
            let found = find_module(&service, &module)?;
            print!("{}", format_module_details(&found, settings));
        }

        ModuleCommands::Edit {
            module,
            title,
            price,
            category,
            description,
        } => {
            let found = find_module(&service, &module)?;
            let patch = ModulePatch {
                title,
                description,
                category,
                price,
            };

            if patch.is_empty() {
                println!("No changes specified. Use --title, --price, --category or --description.");
                return Ok(());
            }

            let updated = service.update(found.id, patch)?;
            println!("Updated module: {}", updated.title);
        }

        ModuleCommands::Delete { module } => {
            let found = find_module(&service, &module)?;
            let removed = service.delete(found.id)?;
            println!("Deleted module: {}", removed.title);
        }

        ModuleCommands::Image { module, file } => {
            let found = find_module(&service, &module)?;
            let updated = service.attach_image(found.id, &file)?;
            println!(
                "Attached image to {}: {}",
                updated.title,
                updated.image_url.as_deref().unwrap_or_default()
            );
        }
    }

    Ok(())
}
