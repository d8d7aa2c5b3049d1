//! Module display formatting
//!
//! Formats catalog modules for terminal output in table and detail views.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::models::Module;

#[derive(Tabled)]
struct ModuleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Image")]
    image: &'static str,
}

/// Format a list of modules as a table
pub fn format_module_list(modules: &[Module], settings: &Settings) -> String {
    if modules.is_empty() {
        return "No modules found.\n".to_string();
    }

    let rows = modules.iter().map(|m| ModuleRow {
        id: m.id.to_string(),
        title: m.title.clone(),
        category: m.category.clone(),
        price: settings.format_price(m.price),
        image: if m.has_image() { "yes" } else { "" },
    });

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push('\n');
    output
}

/// Format a single module with all of its fields
pub fn format_module_details(module: &Module, settings: &Settings) -> String {
    let mut output = String::new();

    output.push_str(&format!("Module: {}\n", module.title));
    output.push_str(&format!("  ID:          {}\n", module.id));
    output.push_str(&format!("  Category:    {}\n", module.category));
    output.push_str(&format!("  Price:       {}\n", settings.format_price(module.price)));

    if !module.description.is_empty() {
        output.push_str(&format!("  Description: {}\n", module.description));
    }

    match &module.image_url {
        Some(url) => output.push_str(&format!("  Image:       {}\n", url)),
        None if !module.image_data.is_empty() => output.push_str("  Image:       (inline)\n"),
        None => {}
    }

    for (key, value) in &module.extra {
        output.push_str(&format!("  {}: {}\n", key, value));
    }

    output
}
