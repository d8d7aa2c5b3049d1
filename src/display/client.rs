//! Client display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Client;

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Details")]
    details: String,
}

/// Format a list of clients as a table
pub fn format_client_list(clients: &[Client]) -> String {
    if clients.is_empty() {
        return "No clients found.\n".to_string();
    }

    let rows = clients.iter().map(|c| ClientRow {
        id: c.id.to_string(),
        name: c.name.clone(),
        details: c
            .fields
            .keys()
            .filter_map(|key| c.field_text(key).map(|value| format!("{}: {}", key, value)))
            .collect::<Vec<_>>()
            .join(", "),
    });

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push('\n');
    output
}

/// Format a single client and the number of budgets issued to it
pub fn format_client_details(client: &Client, budget_count: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!("Client: {}\n", client.name));
    output.push_str(&format!("  ID:      {}\n", client.id));
    for key in client.fields.keys() {
        if let Some(value) = client.field_text(key) {
            output.push_str(&format!("  {}: {}\n", key, value));
        }
    }
    output.push_str(&format!("  Budgets: {}\n", budget_count));

    output
}
