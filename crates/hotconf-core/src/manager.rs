//! Configuration lifecycle: create, load, save, reload and watch

use std::path::Path;
use std::sync::Arc;

use hotconf_format::{Document, Format, Serializer, SerializerRegistry};

use crate::binder;
use crate::error::{Error, Result};
use crate::instance::ConfigInstance;
use crate::io;
use crate::schema::{Config, Schema};
use crate::watch::{WatchOptions, WatchSession};

/// Format-dispatching configuration manager.
///
/// Resolves the serializer from the file extension and drives the binder
/// and the watch session. Cloning shares the serializer registry.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    serializers: Arc<SerializerRegistry>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::with_registry(SerializerRegistry::with_defaults())
    }
}

impl ConfigManager {
    /// Manager with the built-in JSON5, TOML and YAML serializers
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(serializers: SerializerRegistry) -> Self {
        Self {
            serializers: Arc::new(serializers),
        }
    }

    pub fn registry(&self) -> &SerializerRegistry {
        &self.serializers
    }

    /// Format name for a path: its extension, lower-cased.
    ///
    /// Paths without an extension (including dotfiles) resolve to
    /// `json5`. Unknown extensions are returned as-is and rejected at
    /// serializer lookup.
    pub fn resolve_format(path: &Path) -> String {
        match path.extension().map(|ext| ext.to_string_lossy()) {
            Some(ext) if !ext.is_empty() => ext.to_lowercase(),
            _ => Format::DEFAULT.name().to_string(),
        }
    }

    /// Load or create the configuration for a [`Config`] type.
    pub fn initialize<C: Config>(&self, path: impl AsRef<Path>) -> Result<ConfigInstance> {
        let schema = Schema::of::<C>()?;
        self.initialize_schema(path, &schema)
    }

    pub fn initialize_schema(
        &self,
        path: impl AsRef<Path>,
        schema: &Schema,
    ) -> Result<ConfigInstance> {
        self.initialize_schema_with(path, schema, WatchOptions::default())
    }

    /// Load `path`, or write the schema defaults there if it does not exist.
    ///
    /// When the schema has reloadable entries a watch session is attached to
    /// the returned instance. A watch that cannot be registered does not fail
    /// initialization; the session is reported as degraded instead.
    pub fn initialize_schema_with(
        &self,
        path: impl AsRef<Path>,
        schema: &Schema,
        options: WatchOptions,
    ) -> Result<ConfigInstance> {
        let path = path.as_ref();
        let exists = path.try_exists().map_err(|e| Error::io(path, e))?;

        let instance = if exists {
            self.load(path, schema)?
        } else {
            let instance = self.create_defaults(schema);
            self.save(path, &instance)?;
            tracing::info!(
                path = %path.display(),
                schema = schema.name(),
                "Created config with defaults"
            );
            instance
        };

        if schema.has_reloadable() {
            let started = WatchSession::start(self.clone(), path, &instance, options.clone());
            let session = match started {
                Ok(session) => session,
                Err(err) => WatchSession::degraded(path, err.to_string(), options),
            };
            instance.attach_session(session);
        }

        Ok(instance)
    }

    /// Instance holding every declared default. Nothing is written.
    pub fn create_defaults(&self, schema: &Schema) -> ConfigInstance {
        binder::to_defaults(schema)
    }

    /// Read, decode and bind `path`.
    ///
    /// The serializer is resolved before the file is touched, so an
    /// unsupported extension never reads from disk.
    pub fn load(&self, path: impl AsRef<Path>, schema: &Schema) -> Result<ConfigInstance> {
        let document = self.read_document(path)?;
        binder::from_document(schema, &document)
    }

    /// Encode every entry and write it atomically to `path`.
    pub fn save(&self, path: impl AsRef<Path>, instance: &ConfigInstance) -> Result<()> {
        self.write_document(path, &binder::to_document(instance))
    }

    /// Decode `path` with the serializer for its format, without binding.
    pub fn read_document(&self, path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();
        let (format, serializer) = self.serializer_for(path)?;

        let bytes = io::read_bytes(path)?;
        let document = serializer
            .decode(&bytes)
            .map_err(|e| Error::from_format(path, e))?;
        tracing::debug!(
            path = %path.display(),
            format = %format,
            entries = document.len(),
            "Decoded config"
        );
        Ok(document)
    }

    pub fn write_document(&self, path: impl AsRef<Path>, document: &Document) -> Result<()> {
        let path = path.as_ref();
        let (format, serializer) = self.serializer_for(path)?;

        let content = serializer
            .encode(document)
            .map_err(|e| Error::from_format(path, e))?;
        io::write_atomic(path, content.as_bytes())?;

        tracing::debug!(path = %path.display(), format = %format, "Saved config");
        Ok(())
    }

    /// One-shot reload from disk. Running watch sessions are unaffected.
    pub fn reload(&self, path: impl AsRef<Path>, schema: &Schema) -> Result<ConfigInstance> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), schema = schema.name(), "Reloading config");
        self.load(path, schema)
    }

    /// Stop the instance's watch session. Returns `false` if it had none.
    pub fn stop_watch(&self, instance: &ConfigInstance) -> bool {
        instance.stop_watch()
    }

    fn serializer_for(&self, path: &Path) -> Result<(String, Arc<dyn Serializer>)> {
        let format = Self::resolve_format(path);
        let serializer = self
            .serializers
            .lookup(&format)
            .map_err(|e| Error::from_format(path, e))?;
        Ok((format, serializer))
    }
}
