//! Budget display formatting
//!
//! Formats budgets for terminal output: a summary table for listings and a
//! line-by-line view with totals for a single budget.

use std::collections::HashMap;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::models::{Budget, Client, ClientId};

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Lines")]
    lines: usize,
    #[tabled(rename = "Total")]
    total: String,
}

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "Module")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Unit Price")]
    price: String,
    #[tabled(rename = "Units")]
    units: u32,
    #[tabled(rename = "Line Total")]
    total: String,
}

fn client_label(client_id: ClientId, names: &HashMap<ClientId, &str>) -> String {
    names
        .get(&client_id)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("#{} (deleted)", client_id))
}

/// Format a list of budgets as a table
pub fn format_budget_list(budgets: &[Budget], clients: &[Client], settings: &Settings) -> String {
    if budgets.is_empty() {
        return "No budgets found.\n".to_string();
    }

    let names: HashMap<ClientId, &str> = clients.iter().map(|c| (c.id, c.name.as_str())).collect();

    let rows = budgets.iter().map(|b| BudgetRow {
        id: b.id.to_string(),
        date: b.date.format(&settings.date_format).to_string(),
        client: client_label(b.client_id, &names),
        lines: b.modules.len(),
        total: settings.format_price(b.total()),
    });

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push('\n');
    output
}

/// Format a single budget with its lines and grand total
pub fn format_budget_details(budget: &Budget, client: Option<&Client>, settings: &Settings) -> String {
    let mut output = String::new();

    let client_name = client
        .map(|c| c.name.clone())
        .unwrap_or_else(|| format!("#{} (deleted)", budget.client_id));

    output.push_str(&format!("Budget {}\n", budget.id));
    output.push_str(&format!("  Client: {}\n", client_name));
    output.push_str(&format!("  Date:   {}\n", budget.date.format(&settings.date_format)));
    output.push('\n');

    if budget.modules.is_empty() {
        output.push_str("  (no modules)\n");
    } else {
        let rows = budget.modules.iter().map(|line| LineRow {
            id: line.id.to_string(),
            title: line.title.clone(),
            price: settings.format_price(line.price),
            units: line.units,
            total: settings.format_price(line.line_total()),
        });
        output.push_str(&Table::new(rows).with(Style::psql()).to_string());
        output.push('\n');
    }

    output.push('\n');
    output.push_str(&format!("  Total: {}\n", settings.format_price(budget.total())));
    output
}
