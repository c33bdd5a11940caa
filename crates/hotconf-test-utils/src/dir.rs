//! [`ConfigDir`] fixture for config file scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding configuration files.
///
/// # Example
///
/// ```rust
/// use hotconf_test_utils::ConfigDir;
///
/// let dir = ConfigDir::new();
/// let path = dir.write("cfg.json5", "{ retries: 3 }");
/// assert!(path.exists());
/// ```
pub struct ConfigDir {
    temp_dir: TempDir,
}

impl Default for ConfigDir {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `name` inside the directory. Nothing is created.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Write `content` in place, the way a plain editor save does.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Replace the file through a sibling temp file and a rename, the way
    /// atomic-save editors do.
    pub fn replace(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        let staging = self.path(&format!(".{name}.swp"));
        fs::write(&staging, content).unwrap();
        fs::rename(&staging, &path).unwrap();
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name))
            .unwrap_or_else(|e| panic!("ConfigDir::read: {name}: {e}"))
    }

    /// Panics if `name` does not exist.
    pub fn assert_file_exists(&self, name: &str) {
        assert!(
            self.path(name).exists(),
            "expected {name} to exist in {}",
            self.root().display()
        );
    }
}
