//! Migration report formatting

use crate::storage::RepairOutcome;

/// Describe what opening or repairing each dataset did
pub fn format_repair_report(outcomes: &[RepairOutcome]) -> String {
    let mut output = String::new();

    for outcome in outcomes {
        let status = if !outcome.was_stored {
            "created"
        } else if !outcome.changed {
            "up to date"
        } else if outcome.written {
            "migrated"
        } else {
            "pending"
        };

        output.push_str(&format!(
            "{:<10} v{} -> v{}  {}\n",
            outcome.kind.key(),
            outcome.from_version,
            outcome.to_version,
            status
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::DatasetKind;

    #[test]
    fn test_report_lines() {
        let outcomes = [
            RepairOutcome {
                kind: DatasetKind::Modules,
                from_version: 0,
                to_version: 2,
                was_stored: true,
                changed: true,
                written: true,
            },
            RepairOutcome {
                kind: DatasetKind::Clients,
                from_version: 1,
                to_version: 1,
                was_stored: true,
                changed: false,
                written: false,
            },
        ];

        let report = format_repair_report(&outcomes);
        assert!(report.contains("modules    v0 -> v2  migrated"));
        assert!(report.contains("clients    v1 -> v1  up to date"));
    }
}
