//! CSV Export functionality
//!
//! Exports a budget's lines to CSV (spreadsheet-compatible), closed by a
//! grand total row.

use std::io::Write;

use crate::error::{AsedexError, AsedexResult};
use crate::export::json::BudgetExport;
use crate::models::BudgetId;
use crate::storage::Storage;

const HEADER: [&str; 9] = [
    "Budget",
    "Date",
    "Client",
    "Module ID",
    "Title",
    "Category",
    "Unit Price",
    "Units",
    "Line Total",
];

/// Export a budget to CSV
pub fn export_budget_csv<W: Write>(storage: &Storage, id: BudgetId, writer: &mut W) -> AsedexResult<()> {
    let export = BudgetExport::from_storage(storage, id)?;
    let budget = export.budget_id.to_string();
    let date = export.date.to_string();
    let client = export.client_label();

    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADER)
        .map_err(|e| AsedexError::Export(e.to_string()))?;

    for line in &export.lines {
        out.write_record([
            budget.clone(),
            date.clone(),
            client.clone(),
            line.module_id.to_string(),
            line.title.clone(),
            line.category.clone(),
            format!("{:.2}", line.unit_price),
            line.units.to_string(),
            format!("{:.2}", line.line_total),
        ])
        .map_err(|e| AsedexError::Export(e.to_string()))?;
    }

    let total = format!("{:.2}", export.total);
    out.write_record([
        budget.as_str(),
        date.as_str(),
        client.as_str(),
        "",
        "TOTAL",
        "",
        "",
        "",
        total.as_str(),
    ])
    .map_err(|e| AsedexError::Export(e.to_string()))?;

    out.flush().map_err(|e| AsedexError::Export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::create_test_budget;

    #[test]
    fn test_export_budget_csv() {
        let (_temp_dir, storage, budget_id) = create_test_budget();

        let mut output = Vec::new();
        export_budget_csv(&storage, budget_id, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows.len(), 4);
        assert!(rows[0].starts_with("Budget,Date,Client,Module ID"));
        assert!(rows[1].contains(",\"Cabin, deluxe\",Structure,100.00,2,200.00"));
        assert!(rows[2].contains(",Motor,Drive,250.00,1,250.00"));
        assert!(rows[3].ends_with(",TOTAL,,,,450.00"));
        assert!(rows[3].contains(",ACME,"));
    }
}
