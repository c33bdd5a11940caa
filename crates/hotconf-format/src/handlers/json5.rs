//! JSON5 serializer
//!
//! Reads the relaxed JSON superset (comments, unquoted keys, single quotes,
//! trailing commas) and writes plain JSON with `//` comment lines.

use std::fmt::Write as _;

use serde_json::Value;

use super::{root_document, utf8};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::format::Serializer;

const NAME: &str = "JSON5";

/// Serializer for the commented JSON format
#[derive(Debug, Default)]
pub struct Json5Serializer;

impl Json5Serializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for Json5Serializer {
    fn name(&self) -> &str {
        NAME
    }

    fn decode(&self, source: &[u8]) -> Result<Document> {
        let text = utf8(NAME, source)?;
        let root: Value = json5::from_str(text).map_err(|e| Error::decode(NAME, e.to_string()))?;
        root_document(NAME, root)
    }

    fn encode(&self, document: &Document) -> Result<String> {
        let mut out = String::from("{\n");
        let last = document.len().saturating_sub(1);

        for (index, (key, value)) in document.iter().enumerate() {
            if let Some(comment) = document.comment(key) {
                if comment.is_empty() {
                    out.push_str("  //\n");
                }
                for line in comment.lines() {
                    let _ = writeln!(out, "  // {line}");
                }
            }

            let key = serde_json::to_string(key).map_err(|e| Error::encode(NAME, e.to_string()))?;
            let value =
                serde_json::to_string(value).map_err(|e| Error::encode(NAME, e.to_string()))?;
            let separator = if index < last { "," } else { "" };
            let _ = writeln!(out, "  {key}: {value}{separator}");
        }

        out.push_str("}\n");
        Ok(out)
    }
}
