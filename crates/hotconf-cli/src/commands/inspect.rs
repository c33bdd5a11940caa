//! Inspect command implementation

use std::path::Path;

use colored::Colorize;
use hotconf_core::{ConfigManager, Schema};
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Serialize)]
struct Report {
    path: String,
    format: String,
    entries: Vec<EntryRow>,
}

#[derive(Debug, Serialize)]
struct EntryRow {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    value: serde_json::Value,
}

/// Run the inspect command
pub fn run_inspect(path: &Path, json: bool) -> Result<()> {
    let report = build_report(&ConfigManager::new(), path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} ({})", report.path.bold(), report.format.cyan());
    if report.entries.is_empty() {
        println!("  {}", "No entries".dimmed());
        return Ok(());
    }

    let name_width = report.entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let kind_width = report.entries.iter().map(|e| e.kind.len()).max().unwrap_or(0);
    for entry in &report.entries {
        println!(
            "  {}  {}  {}",
            format!("{:name_width$}", entry.name).cyan(),
            format!("{:kind_width$}", entry.kind).dimmed(),
            entry.value
        );
    }
    Ok(())
}

fn build_report(manager: &ConfigManager, path: &Path) -> Result<Report> {
    super::check_format(manager, path)?;
    let document = manager.read_document(path)?;
    let schema = Schema::infer(super::schema_name(path), &document)?;

    let entries = schema
        .entries()
        .iter()
        .map(|entry| EntryRow {
            name: entry.name().to_string(),
            kind: entry.tag().to_string(),
            value: entry.default_value().to_json(),
        })
        .collect();

    Ok(Report {
        path: path.display().to_string(),
        format: ConfigManager::resolve_format(path),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotconf_test_utils::ConfigDir;

    #[test]
    fn report_lists_entries_with_inferred_types() {
        let dir = ConfigDir::new();
        let path = dir.write("app.yaml", "retries: 3\nratio: 0.5\nhosts: [a, b]\n");

        let report = build_report(&ConfigManager::new(), &path).unwrap();

        assert_eq!(report.format, "yaml");
        let rows: Vec<_> = report
            .entries
            .iter()
            .map(|e| (e.name.as_str(), e.kind.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("retries", "integer"),
                ("ratio", "float"),
                ("hosts", "list<string>")
            ]
        );
    }
}
