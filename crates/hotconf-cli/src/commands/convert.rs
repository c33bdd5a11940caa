//! Convert command implementation

use std::path::Path;

use colored::Colorize;
use hotconf_core::ConfigManager;

use crate::error::{CliError, Result};

/// Run the convert command
pub fn run_convert(source: &Path, destination: &Path) -> Result<()> {
    if source == destination {
        return Err(CliError::user("Source and destination are the same file"));
    }

    let manager = ConfigManager::new();
    super::check_format(&manager, source)?;
    super::check_format(&manager, destination)?;
    let document = manager.read_document(source)?;
    manager.write_document(destination, &document)?;

    println!(
        "{} {} ({}) -> {} ({})",
        "Converted".green().bold(),
        source.display(),
        ConfigManager::resolve_format(source),
        destination.display(),
        ConfigManager::resolve_format(destination)
    );
    Ok(())
}
