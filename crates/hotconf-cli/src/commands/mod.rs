//! Command implementations

mod convert;
mod inspect;
mod watch;

pub use convert::run_convert;
pub use inspect::run_inspect;
pub use watch::run_watch;

use std::path::Path;

use hotconf_core::ConfigManager;

use crate::error::{CliError, Result};

/// Reject a path whose format has no registered serializer, listing the
/// formats that do.
fn check_format(manager: &ConfigManager, path: &Path) -> Result<()> {
    let format = ConfigManager::resolve_format(path);
    let registry = manager.registry();
    if registry.contains(&format) {
        return Ok(());
    }
    Err(CliError::user(format!(
        "Unsupported config format '{format}' for {} (supported: {})",
        path.display(),
        registry.names().join(", ")
    )))
}

/// Schema name for a file: its stem, or `config` when there is none.
fn schema_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "config".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_name_uses_stem() {
        assert_eq!(schema_name(Path::new("/etc/svc/app.toml")), "app");
        assert_eq!(schema_name(Path::new(".hotconf")), ".hotconf");
        assert_eq!(schema_name(Path::new("/")), "config");
    }

    #[test]
    fn unknown_format_lists_registered_ones() {
        let manager = ConfigManager::new();
        assert!(check_format(&manager, Path::new("app.TOML")).is_ok());

        let message = check_format(&manager, Path::new("app.ini"))
            .unwrap_err()
            .to_string();
        assert!(message.contains("'ini'"), "{message}");
        for name in ["json5", "toml", "yaml"] {
            assert!(message.contains(name), "{message}");
        }
    }
}
