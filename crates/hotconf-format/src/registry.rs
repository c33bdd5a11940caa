//! Format-name keyed serializer lookup

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::format::{Format, Serializer};

/// Maps lower-cased format names to serializers.
///
/// Built once and then shared read-only; cloning is cheap since the
/// serializers themselves are reference counted.
#[derive(Clone, Default)]
pub struct SerializerRegistry {
    serializers: HashMap<String, Arc<dyn Serializer>>,
}

impl SerializerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in format under each of its extensions
    /// (`json5`, `json`, `toml`, `yaml`, `yml`).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for format in Format::ALL {
            let serializer = format.serializer();
            for ext in format.extensions() {
                registry.register(*ext, Arc::clone(&serializer));
            }
        }
        registry
    }

    /// Register a serializer under a format name, returning the one it replaced.
    pub fn register(
        &mut self,
        name: impl AsRef<str>,
        serializer: Arc<dyn Serializer>,
    ) -> Option<Arc<dyn Serializer>> {
        let name = name.as_ref().to_lowercase();
        tracing::debug!(format = %name, serializer = serializer.name(), "Registering serializer");
        self.serializers.insert(name, serializer)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Serializer>> {
        self.serializers.get(&name.to_lowercase()).cloned()
    }

    /// Look up a serializer, failing with [`Error::UnsupportedFormat`].
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Serializer>> {
        self.get(name).ok_or_else(|| Error::UnsupportedFormat {
            format: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.serializers.contains_key(&name.to_lowercase())
    }

    /// Registered format names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.serializers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializerRegistry")
            .field("formats", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    #[derive(Debug)]
    struct Upper;

    impl Serializer for Upper {
        fn name(&self) -> &str {
            "UPPER"
        }

        fn decode(&self, _source: &[u8]) -> Result<Document> {
            Ok(Document::new())
        }

        fn encode(&self, _document: &Document) -> Result<String> {
            Ok("UPPER".into())
        }
    }

    #[test]
    fn defaults_cover_builtin_formats_and_aliases() {
        let registry = SerializerRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["json", "json5", "toml", "yaml", "yml"]);
        assert_eq!(registry.lookup("yml").unwrap().name(), "YAML");
        assert_eq!(registry.lookup("json").unwrap().name(), "JSON5");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = SerializerRegistry::with_defaults();
        assert!(registry.contains("TOML"));
        assert_eq!(registry.lookup("Yaml").unwrap().name(), "YAML");
    }

    #[test]
    fn unknown_format_is_rejected() {
        let registry = SerializerRegistry::with_defaults();
        let err = registry.lookup("xyz").err().unwrap();
        assert!(matches!(err, Error::UnsupportedFormat { ref format } if format == "xyz"));
    }

    #[test]
    fn register_replaces_existing() {
        let mut registry = SerializerRegistry::with_defaults();
        let previous = registry.register("TOML", Arc::new(Upper));
        assert_eq!(previous.map(|s| s.name().to_string()), Some("TOML".to_string()));
        assert_eq!(registry.lookup("toml").unwrap().name(), "UPPER");
    }
}
