//! Schema descriptors
//!
//! A [`Schema`] is the ordered, immutable list of entries a configuration
//! type persists. It is built once per type through [`Schema::of`] and then
//! shared by every instance of that type.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock, RwLock};

use hotconf_format::Document;

use crate::error::{Error, Result};
use crate::value::{TypeTag, Value};

/// A type that describes a configuration file.
///
/// # Example
///
/// ```
/// use hotconf_core::{Config, EntrySpec};
///
/// struct ServiceConfig;
///
/// impl Config for ServiceConfig {
///     const NAME: &'static str = "ServiceConfig";
///
///     fn entries() -> Vec<EntrySpec> {
///         vec![
///             EntrySpec::integer("retries", 3).reloadable(),
///             EntrySpec::string("name", "svc").comment("service name"),
///         ]
///     }
/// }
/// ```
pub trait Config: 'static {
    /// Name used in diagnostics
    const NAME: &'static str;

    /// Entries in declaration order
    fn entries() -> Vec<EntrySpec>;
}

/// Declaration of one persisted entry
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySpec {
    name: String,
    tag: TypeTag,
    default: Value,
    comment: Option<String>,
    reloadable: bool,
}

impl EntrySpec {
    pub fn new(name: impl Into<String>, tag: TypeTag, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            tag,
            default: default.into(),
            comment: None,
            reloadable: false,
        }
    }

    pub fn bool(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, TypeTag::Bool, default)
    }

    pub fn integer(name: impl Into<String>, default: i64) -> Self {
        Self::new(name, TypeTag::Integer, default)
    }

    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Self::new(name, TypeTag::Float, default)
    }

    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(name, TypeTag::String, default.into())
    }

    /// Allow live updates of this entry while the file is watched.
    pub fn reloadable(mut self) -> Self {
        self.reloadable = true;
        self
    }

    /// Attach a comment, rendered above the entry by formats that support it.
    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.comment = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn description(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn is_reloadable(&self) -> bool {
        self.reloadable
    }
}

#[derive(Debug, PartialEq)]
struct SchemaInner {
    name: String,
    entries: Vec<EntrySpec>,
    index: HashMap<String, usize>,
}

/// Validated, shareable schema descriptor
#[derive(Debug, Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

static REGISTERED: LazyLock<RwLock<HashMap<TypeId, Schema>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

impl Schema {
    /// Validate entries and build a schema.
    ///
    /// Fails if a name is empty or repeated, or a default does not match
    /// its declared type.
    pub fn new(name: impl Into<String>, entries: Vec<EntrySpec>) -> Result<Self> {
        let name = name.into();
        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(entries.len());

        for mut entry in entries {
            if entry.name.is_empty() {
                return Err(Error::schema(&name, "entry names must not be empty"));
            }
            if !seen.insert(entry.name.clone()) {
                return Err(Error::schema(
                    &name,
                    format!("duplicate entry '{}'", entry.name),
                ));
            }
            entry.default = entry.tag.conform(entry.default).map_err(|m| {
                Error::schema(&name, format!("default of '{}': {m}", entry.name))
            })?;
            validated.push(entry);
        }

        let index = validated
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();

        Ok(Self {
            inner: Arc::new(SchemaInner {
                name,
                entries: validated,
                index,
            }),
        })
    }

    /// Registered schema for a [`Config`] type, built on first use.
    pub fn of<C: Config>() -> Result<Self> {
        let key = TypeId::of::<C>();
        if let Some(schema) = registry_read().get(&key) {
            return Ok(schema.clone());
        }

        let schema = Self::new(C::NAME, C::entries())?;
        let mut registered = REGISTERED
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let schema = registered.entry(key).or_insert(schema).clone();
        tracing::debug!(schema = C::NAME, entries = schema.len(), "Registered schema");
        Ok(schema)
    }

    /// Derive a schema from an existing document.
    ///
    /// Every top-level key becomes a reloadable entry whose default is the
    /// document's current value.
    pub fn infer(name: impl Into<String>, document: &Document) -> Result<Self> {
        let name = name.into();
        let mut entries = Vec::with_capacity(document.len());

        for (key, raw) in document.iter() {
            let tag = TypeTag::infer(raw).ok_or_else(|| {
                Error::schema(&name, format!("cannot infer a type for entry '{key}'"))
            })?;
            let default = tag
                .coerce(raw)
                .map_err(|m| Error::schema(&name, format!("entry '{key}': {m}")))?;
            entries.push(EntrySpec::new(key, tag, default).reloadable());
        }

        Self::new(name, entries)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[EntrySpec] {
        &self.inner.entries
    }

    pub fn entry(&self, name: &str) -> Option<&EntrySpec> {
        self.index_of(name).map(|i| &self.inner.entries[i])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.inner.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn has_reloadable(&self) -> bool {
        self.inner.entries.iter().any(EntrySpec::is_reloadable)
    }

    /// Reloadable entries with their slot index
    pub fn reloadable(&self) -> impl Iterator<Item = (usize, &EntrySpec)> {
        self.inner
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_reloadable())
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

fn registry_read() -> std::sync::RwLockReadGuard<'static, HashMap<TypeId, Schema>> {
    REGISTERED
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
