//! Budget export command
//!
//! Writes a budget to a file (or stdout) in the chosen format.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::ValueEnum;

use crate::error::{AsedexError, AsedexResult};
use crate::export::{export_budget_csv, export_budget_json, export_budget_yaml};
use crate::models::BudgetId;
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// CSV lines with a total row
    Csv,
    /// JSON document
    Json,
    /// YAML document (human-readable)
    Yaml,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

fn write_budget<W: Write>(storage: &Storage, id: BudgetId, format: ExportFormat, writer: &mut W) -> AsedexResult<()> {
    match format {
        ExportFormat::Csv => export_budget_csv(storage, id, writer),
        ExportFormat::Json => export_budget_json(storage, id, writer),
        ExportFormat::Yaml => export_budget_yaml(storage, id, writer),
    }
}

/// Export a budget; `None` writes into the exports directory, `-` to stdout
pub fn export_budget(
    storage: &Storage,
    id: BudgetId,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> AsedexResult<()> {
    if output.as_deref().map(|p| p.as_os_str() == "-").unwrap_or(false) {
        let stdout = std::io::stdout();
        let mut writer = stdout.lock();
        return write_budget(storage, id, format, &mut writer);
    }

    let output = match output {
        Some(path) => path,
        None => {
            let dir = storage.paths().exports_dir();
            std::fs::create_dir_all(&dir).map_err(|e| {
                AsedexError::Export(format!("Failed to create {}: {}", dir.display(), e))
            })?;
            dir.join(format!("budget-{}.{}", id, format.extension()))
        }
    };

    let file = File::create(&output).map_err(|e| {
        AsedexError::Export(format!("Failed to create file {}: {}", output.display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    write_budget(storage, id, format, &mut writer)?;
    writer
        .flush()
        .map_err(|e| AsedexError::Export(e.to_string()))?;

    println!("Budget {} exported to: {}", id, output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::create_test_budget;

    #[test]
    fn test_export_to_default_directory() {
        let (temp_dir, storage, budget_id) = create_test_budget();

        export_budget(&storage, budget_id, ExportFormat::Json, None).unwrap();

        let path = temp_dir
            .path()
            .join("exports")
            .join(format!("budget-{}.json", budget_id));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("\"client_name\": \"ACME\""));
    }

    #[test]
    fn test_export_to_explicit_file() {
        let (temp_dir, storage, budget_id) = create_test_budget();
        let path = temp_dir.path().join("quote.yaml");

        export_budget(&storage, budget_id, ExportFormat::Yaml, Some(path.clone())).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("lines:"));
    }
}
