//! TOML serializer using the `toml` crate

use serde_json::{Map, Number, Value};

use super::utf8;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::format::Serializer;

const NAME: &str = "TOML";

/// Serializer for TOML files. Comments are not rendered.
#[derive(Debug, Default)]
pub struct TomlSerializer;

impl TomlSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for TomlSerializer {
    fn name(&self) -> &str {
        NAME
    }

    fn decode(&self, source: &[u8]) -> Result<Document> {
        let text = utf8(NAME, source)?;
        let table: toml::Table =
            toml::from_str(text).map_err(|e| Error::decode(NAME, e.to_string()))?;

        let mut entries = Map::new();
        for (key, value) in table {
            let value = toml_to_json(value).map_err(|message| {
                Error::decode(NAME, format!("entry '{key}': {message}"))
            })?;
            entries.insert(key, value);
        }
        Ok(Document::from_map(entries))
    }

    fn encode(&self, document: &Document) -> Result<String> {
        let mut table = toml::Table::new();
        for (key, value) in document.iter() {
            let value = json_to_toml(value)
                .map_err(|message| Error::encode(NAME, format!("entry '{key}': {message}")))?;
            table.insert(key.to_string(), value);
        }
        toml::to_string_pretty(&table).map_err(|e| Error::encode(NAME, e.to_string()))
    }
}

fn toml_to_json(value: toml::Value) -> std::result::Result<Value, String> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| format!("non-finite float {f}"))?,
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(toml_to_json)
                .collect::<std::result::Result<_, _>>()?,
        ),
        toml::Value::Table(table) => {
            let mut map = Map::new();
            for (key, value) in table {
                map.insert(key, toml_to_json(value)?);
            }
            Value::Object(map)
        }
    })
}

fn json_to_toml(value: &Value) -> std::result::Result<toml::Value, String> {
    Ok(match value {
        Value::Null => return Err("null cannot be represented in TOML".to_string()),
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => toml::Value::Integer(i),
            (None, Some(_)) if n.is_u64() => {
                return Err(format!("integer {n} exceeds the TOML integer range"));
            }
            (None, Some(f)) => toml::Value::Float(f),
            (None, None) => return Err(format!("unrepresentable number {n}")),
        },
        Value::String(s) => toml::Value::String(s.clone()),
        Value::Array(items) => toml::Value::Array(
            items
                .iter()
                .map(json_to_toml)
                .collect::<std::result::Result<_, _>>()?,
        ),
        Value::Object(map) => {
            let mut table = toml::Table::new();
            for (key, value) in map {
                table.insert(key.clone(), json_to_toml(value)?);
            }
            toml::Value::Table(table)
        }
    })
}
