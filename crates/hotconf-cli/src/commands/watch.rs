//! Watch command implementation

use std::path::Path;
use std::sync::mpsc;

use colored::Colorize;
use hotconf_core::{ConfigManager, Schema, WatchEvent, WatchOptions};

use crate::error::{CliError, Result};

/// Run the watch command. Returns only when the session ends.
pub fn run_watch(path: &Path) -> Result<()> {
    let manager = ConfigManager::new();
    super::check_format(&manager, path)?;
    let document = manager.read_document(path)?;
    let schema = Schema::infer(super::schema_name(path), &document)?;
    if schema.is_empty() {
        return Err(CliError::user(format!(
            "{} has no entries to watch",
            path.display()
        )));
    }

    let (tx, rx) = mpsc::channel();
    let _config =
        manager.initialize_schema_with(path, &schema, WatchOptions::new().with_events(tx))?;

    for event in rx {
        match event {
            WatchEvent::Started { path } => {
                println!("{} {}", "Watching".green().bold(), path.display());
            }
            WatchEvent::Applied(changes) => {
                for change in changes {
                    println!(
                        "  {} {}: {} -> {}",
                        "~".yellow(),
                        change.name.cyan(),
                        change.old,
                        change.new
                    );
                }
            }
            WatchEvent::ReloadFailed(message) => {
                eprintln!("{}: {}", "reload failed".yellow().bold(), message);
            }
            WatchEvent::Degraded(message) => {
                return Err(CliError::user(format!("Watch lost: {message}")));
            }
            WatchEvent::Stopped => break,
        }
    }
    Ok(())
}
