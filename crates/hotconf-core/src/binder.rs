//! Mapping between typed instances and serializer-neutral documents
//!
//! This is the only module that knows how schema entries correspond to
//! document keys. Document keys are exactly the entry names; keys the schema
//! does not declare are ignored.

use hotconf_format::Document;

use crate::error::{Error, Result};
use crate::instance::ConfigInstance;
use crate::schema::Schema;
use crate::value::Value;

/// A reloadable entry whose live value was replaced during a merge
#[derive(Debug, Clone, PartialEq)]
pub struct EntryChange {
    pub name: String,
    pub old: Value,
    pub new: Value,
}

/// Instance holding every entry's declared default.
pub fn to_defaults(schema: &Schema) -> ConfigInstance {
    let values = schema
        .entries()
        .iter()
        .map(|e| e.default_value().clone())
        .collect();
    ConfigInstance::from_values(schema.clone(), values)
}

/// Project every entry, in declaration order, with its comment attached.
pub fn to_document(instance: &ConfigInstance) -> Document {
    let mut document = Document::new();
    for (index, entry) in instance.schema().entries().iter().enumerate() {
        document.insert_commented(
            entry.name(),
            instance.slot(index).to_json(),
            entry.description(),
        );
    }
    document
}

/// Bind a decoded document to a schema.
///
/// Missing entries keep their default. The first entry that cannot be
/// converted to its declared type fails the whole bind.
pub fn from_document(schema: &Schema, document: &Document) -> Result<ConfigInstance> {
    let mut values = Vec::with_capacity(schema.len());

    for entry in schema.entries() {
        let value = match document.get(entry.name()) {
            Some(raw) => entry
                .tag()
                .coerce(raw)
                .map_err(|m| Error::binding(entry.name(), m.to_string()))?,
            None => entry.default_value().clone(),
        };
        values.push(value);
    }

    for key in document.keys().filter(|k| schema.index_of(k).is_none()) {
        tracing::debug!(schema = schema.name(), key, "Ignoring unknown key");
    }

    Ok(ConfigInstance::from_values(schema.clone(), values))
}

/// Copy changed reloadable entries from `reloaded` into `live`.
///
/// Non-reloadable entries are never written, whatever the reloaded
/// instance holds. Returns one record per slot that actually changed.
pub fn merge_reloadable(
    live: &ConfigInstance,
    reloaded: &ConfigInstance,
) -> Result<Vec<EntryChange>> {
    let schema = live.schema();
    if schema != reloaded.schema() {
        return Err(Error::schema(
            schema.name(),
            format!("cannot merge an instance of {}", reloaded.schema().name()),
        ));
    }

    let mut changes = Vec::new();
    for (index, entry) in schema.reloadable() {
        let new = reloaded.slot(index);
        if live.slot(index) == new {
            continue;
        }
        let old = live.replace_slot(index, new.clone());
        if old != new {
            changes.push(EntryChange {
                name: entry.name().to_string(),
                old,
                new,
            });
        }
    }
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntrySpec;
    use crate::value::TypeTag;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(
            "svc",
            vec![
                EntrySpec::integer("retries", 3)
                    .reloadable()
                    .comment("attempts before giving up"),
                EntrySpec::string("name", "svc"),
                EntrySpec::new("ports", TypeTag::list(TypeTag::Integer), vec![80]).reloadable(),
            ],
        )
        .unwrap()
    }

    fn doc(value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(map) => Document::from_map(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn defaults_match_declarations() {
        let instance = to_defaults(&schema());
        assert_eq!(instance.value("retries").unwrap(), Value::Integer(3));
        assert_eq!(instance.value("name").unwrap(), Value::from("svc"));
        assert_eq!(instance.value("ports").unwrap(), Value::from(vec![80]));
    }

    #[test]
    fn document_follows_declaration_order_and_carries_comments() {
        let document = to_document(&to_defaults(&schema()));
        let keys: Vec<_> = document.keys().collect();
        assert_eq!(keys, vec!["retries", "name", "ports"]);
        assert_eq!(document.comment("retries"), Some("attempts before giving up"));
        assert_eq!(document.comment("name"), None);
        assert_eq!(document.get("ports"), Some(&json!([80])));
    }

    #[test]
    fn missing_keys_keep_defaults_and_unknown_keys_are_ignored() {
        let document = doc(json!({"retries": 9, "extra": true}));
        let instance = from_document(&schema(), &document).unwrap();
        assert_eq!(instance.value("retries").unwrap(), Value::Integer(9));
        assert_eq!(instance.value("name").unwrap(), Value::from("svc"));
    }

    #[test]
    fn one_bad_entry_fails_the_whole_bind() {
        let document = doc(json!({"retries": "5", "name": "ok"}));
        let err = from_document(&schema(), &document).unwrap_err();
        match err {
            Error::Binding { entry, message } => {
                assert_eq!(entry, "retries");
                assert_eq!(message, "expected integer, found string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nested_binding_errors_name_the_element() {
        let err = from_document(&schema(), &doc(json!({"ports": [80, "x"]}))).unwrap_err();
        assert!(err.to_string().contains("ports"));
        assert!(err.to_string().contains("[1]"));
    }

    #[test]
    fn merge_touches_only_reloadable_entries() {
        let schema = schema();
        let live = to_defaults(&schema);
        let reloaded = from_document(
            &schema,
            &doc(json!({"retries": 5, "name": "renamed", "ports": [80, 443]})),
        )
        .unwrap();

        let changes = merge_reloadable(&live, &reloaded).unwrap();

        assert_eq!(
            changes,
            vec![
                EntryChange {
                    name: "retries".into(),
                    old: Value::Integer(3),
                    new: Value::Integer(5),
                },
                EntryChange {
                    name: "ports".into(),
                    old: Value::from(vec![80]),
                    new: Value::from(vec![80, 443]),
                },
            ]
        );
        assert_eq!(live.value("retries").unwrap(), Value::Integer(5));
        assert_eq!(live.value("name").unwrap(), Value::from("svc"));
    }

    #[test]
    fn merging_equal_values_reports_nothing() {
        let schema = schema();
        let live = to_defaults(&schema);
        let reloaded = to_defaults(&schema);
        assert!(merge_reloadable(&live, &reloaded).unwrap().is_empty());
    }

    #[test]
    fn merge_requires_the_same_schema() {
        let other =
            Schema::new("other", vec![EntrySpec::integer("retries", 1).reloadable()]).unwrap();
        let result = merge_reloadable(&to_defaults(&schema()), &to_defaults(&other));
        assert!(matches!(result, Err(Error::Schema { .. })));
    }
}
