//! Format serializers

mod json5;
mod toml;
mod yaml;

pub use self::json5::Json5Serializer;
pub use self::toml::TomlSerializer;
pub use self::yaml::YamlSerializer;

use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::{Error, Result};

fn utf8<'a>(format: &str, source: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(source).map_err(|e| Error::decode(format, e.to_string()))
}

/// A decoded root must be a mapping; `null` (an empty YAML file) is an empty one.
fn root_document(format: &str, root: Value) -> Result<Document> {
    match root {
        Value::Object(map) => Ok(Document::from_map(map)),
        Value::Null => Ok(Document::from_map(Map::new())),
        other => Err(Error::decode(
            format,
            format!("root must be a mapping, found {}", kind_of(&other)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}
