//! Standalone repair of stored datasets

use tracing::info;

use crate::display::format_repair_report;
use crate::error::{AsedexError, AsedexResult};
use crate::migration::DatasetKind;
use crate::storage::Storage;

/// Migrate one dataset (by key) or all of them, writing the result back
pub fn handle_migrate_command(storage: &Storage, dataset: Option<String>) -> AsedexResult<()> {
    let outcomes = match dataset {
        Some(key) => {
            let kind: DatasetKind = key.parse().map_err(AsedexError::Validation)?;
            storage.repair(kind)?.into_iter().collect()
        }
        None => storage.repair_all()?,
    };

    info!(operation = "migrate", datasets = outcomes.len(), "repair finished");
    print!("{}", format_repair_report(&outcomes));
    Ok(())
}
