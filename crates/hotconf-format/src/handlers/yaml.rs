//! YAML serializer using serde_yaml

use serde_json::Value;

use super::root_document;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::format::Serializer;

const NAME: &str = "YAML";

/// Serializer for YAML files. Comments are not rendered.
#[derive(Debug, Default)]
pub struct YamlSerializer;

impl YamlSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for YamlSerializer {
    fn name(&self) -> &str {
        NAME
    }

    fn decode(&self, source: &[u8]) -> Result<Document> {
        if source.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::new());
        }
        let root: Value =
            serde_yaml::from_slice(source).map_err(|e| Error::decode(NAME, e.to_string()))?;
        root_document(NAME, root)
    }

    fn encode(&self, document: &Document) -> Result<String> {
        serde_yaml::to_string(document.as_map()).map_err(|e| Error::encode(NAME, e.to_string()))
    }
}
