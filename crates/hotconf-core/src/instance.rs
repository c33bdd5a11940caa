//! Live configuration instances
//!
//! An instance owns one lock per slot. The owner may read or write any slot
//! at any time; a watch session only ever writes reloadable slots. Each read
//! and write is atomic per slot, so a reader never observes a torn value.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::value::{FromValue, Value};
use crate::watch::{WatchSession, WatchStats, WatchStatus};

pub(crate) struct Shared {
    schema: Schema,
    slots: Vec<RwLock<Value>>,
    session: Mutex<Option<WatchSession>>,
}

/// A fully bound configuration, one typed value per schema entry.
pub struct ConfigInstance {
    shared: Arc<Shared>,
}

impl ConfigInstance {
    /// Build from values in schema order. Callers guarantee the values
    /// already conform to their declared types.
    pub(crate) fn from_values(schema: Schema, values: Vec<Value>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self {
            shared: Arc::new(Shared {
                schema,
                slots: values.into_iter().map(RwLock::new).collect(),
                session: Mutex::new(None),
            }),
        }
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub(crate) fn downgrade(&self) -> Weak<Shared> {
        Arc::downgrade(&self.shared)
    }

    pub fn schema(&self) -> &Schema {
        &self.shared.schema
    }

    /// Current value of an entry
    pub fn value(&self, name: &str) -> Result<Value> {
        let index = self.index(name)?;
        Ok(self.slot(index))
    }

    /// Current value of an entry, converted to a Rust type.
    ///
    /// ```
    /// # use hotconf_core::{ConfigManager, EntrySpec, Schema};
    /// let schema = Schema::new("svc", vec![EntrySpec::integer("retries", 3)])?;
    /// let config = ConfigManager::new().create_defaults(&schema);
    /// let retries: u32 = config.get("retries")?;
    /// assert_eq!(retries, 3);
    /// # Ok::<(), hotconf_core::Error>(())
    /// ```
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.value(name)?;
        T::from_value(&value).ok_or_else(|| {
            Error::binding(
                name,
                format!(
                    "{} value does not fit {}",
                    value.kind(),
                    std::any::type_name::<T>()
                ),
            )
        })
    }

    /// Replace an entry's value, returning the previous one.
    ///
    /// The value is checked against the declared type first.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<Value> {
        let index = self.index(name)?;
        let entry = &self.schema().entries()[index];
        let value = entry
            .tag()
            .conform(value.into())
            .map_err(|m| Error::binding(name, m.to_string()))?;
        Ok(self.replace_slot(index, value))
    }

    /// All entries in declaration order
    pub fn snapshot(&self) -> Vec<(String, Value)> {
        self.schema()
            .entries()
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name().to_string(), self.slot(i)))
            .collect()
    }

    /// Status of the watch session, or `None` if none was started.
    pub fn watch_status(&self) -> Option<WatchStatus> {
        self.session().as_ref().map(WatchSession::status)
    }

    pub fn watch_stats(&self) -> Option<WatchStats> {
        self.session().as_ref().map(WatchSession::stats)
    }

    /// Stop the watch session, if any.
    ///
    /// Once this returns no further merges are applied to this instance.
    /// Returns `false` when there was no session to stop.
    pub fn stop_watch(&self) -> bool {
        let session = self.session().take();
        match session {
            Some(mut session) => {
                session.stop();
                true
            }
            None => false,
        }
    }

    pub(crate) fn attach_session(&self, session: WatchSession) {
        let previous = self.session().replace(session);
        if let Some(mut previous) = previous {
            previous.stop();
        }
    }

    pub(crate) fn slot(&self, index: usize) -> Value {
        self.shared.slots[index]
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub(crate) fn replace_slot(&self, index: usize, value: Value) -> Value {
        let mut slot = self.shared.slots[index]
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *slot, value)
    }

    fn index(&self, name: &str) -> Result<usize> {
        self.schema()
            .index_of(name)
            .ok_or_else(|| Error::UnknownEntry {
                schema: self.schema().name().to_string(),
                entry: name.to_string(),
            })
    }

    fn session(&self) -> MutexGuard<'_, Option<WatchSession>> {
        self.shared
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PartialEq for ConfigInstance {
    fn eq(&self, other: &Self) -> bool {
        self.schema() == other.schema() && self.snapshot() == other.snapshot()
    }
}

impl fmt::Debug for ConfigInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in self.snapshot() {
            map.entry(&name, &value);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntrySpec;
    use crate::value::TypeTag;

    fn instance() -> ConfigInstance {
        let schema = Schema::new(
            "svc",
            vec![
                EntrySpec::integer("retries", 3).reloadable(),
                EntrySpec::float("ratio", 0.5),
                EntrySpec::new("hosts", TypeTag::list(TypeTag::String), vec!["a"]),
            ],
        )
        .unwrap();
        let values = schema
            .entries()
            .iter()
            .map(|e| e.default_value().clone())
            .collect();
        ConfigInstance::from_values(schema, values)
    }

    #[test]
    fn typed_get() {
        let config = instance();
        assert_eq!(config.get::<i64>("retries").unwrap(), 3);
        assert_eq!(config.get::<Vec<String>>("hosts").unwrap(), vec!["a"]);
    }

    #[test]
    fn get_with_wrong_rust_type_is_a_binding_error() {
        let err = instance().get::<String>("retries").unwrap_err();
        assert!(matches!(err, Error::Binding { ref entry, .. } if entry == "retries"));
    }

    #[test]
    fn set_returns_previous_value() {
        let config = instance();
        let previous = config.set("retries", 7).unwrap();
        assert_eq!(previous, Value::Integer(3));
        assert_eq!(config.get::<i64>("retries").unwrap(), 7);
    }

    #[test]
    fn set_checks_declared_type() {
        let config = instance();
        assert!(config.set("retries", "seven").is_err());
        assert_eq!(config.get::<i64>("retries").unwrap(), 3);
    }

    #[test]
    fn set_widens_integers_for_float_entries() {
        let config = instance();
        config.set("ratio", 2).unwrap();
        assert_eq!(config.value("ratio").unwrap(), Value::Float(2.0));
    }

    #[test]
    fn unknown_entries_are_reported() {
        let err = instance().value("missing").unwrap_err();
        assert_eq!(err.to_string(), "Schema svc has no entry named 'missing'");
    }

    #[test]
    fn no_session_without_watch() {
        let config = instance();
        assert_eq!(config.watch_status(), None);
        assert!(!config.stop_watch());
    }

    #[test]
    fn concurrent_slot_access_never_tears() {
        let config = Arc::new(instance());
        config.set("hosts", vec!["h0"]).unwrap();
        let writer = {
            let config = Arc::clone(&config);
            std::thread::spawn(move || {
                for i in 0..500 {
                    let hosts: Vec<String> = (0..=i % 5).map(|n| format!("h{n}")).collect();
                    config.set("hosts", hosts).unwrap();
                }
            })
        };

        for _ in 0..500 {
            let hosts: Vec<String> = config.get("hosts").unwrap();
            for (n, host) in hosts.iter().enumerate() {
                assert_eq!(host, &format!("h{n}"));
            }
        }
        writer.join().unwrap();
    }
}
