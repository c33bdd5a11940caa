//! Serializer-neutral document

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Ordered mapping of entry name to untyped value.
///
/// This is the intermediate form between typed configuration instances and
/// format-specific text. Comments travel out-of-band, keyed by entry name,
/// so formats that cannot express them can ignore them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: Map<String, Value>,
    comments: HashMap<String, String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already decoded mapping. Insertion order is kept.
    pub fn from_map(entries: Map<String, Value>) -> Self {
        Self {
            entries,
            comments: HashMap::new(),
        }
    }

    /// Insert or replace an entry, keeping its original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Insert an entry together with an optional comment.
    pub fn insert_commented(
        &mut self,
        key: impl Into<String>,
        value: Value,
        comment: Option<&str>,
    ) {
        let key = key.into();
        match comment {
            Some(text) => {
                self.comments.insert(key.clone(), text.to_string());
            }
            None => {
                self.comments.remove(&key);
            }
        }
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Comment attached to an entry, if any
    pub fn comment(&self, key: &str) -> Option<&str> {
        self.comments.get(key).map(String::as_str)
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the underlying mapping, comments excluded
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insertion_order_is_preserved() {
        let mut doc = Document::new();
        doc.insert("zeta", json!(1));
        doc.insert("alpha", json!(2));
        doc.insert("mid", json!(3));

        let keys: Vec<_> = doc.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn replacing_an_entry_keeps_its_position() {
        let mut doc = Document::new();
        doc.insert("a", json!(1));
        doc.insert("b", json!(2));
        doc.insert("a", json!(10));

        let keys: Vec<_> = doc.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(doc.get("a"), Some(&json!(10)));
    }

    #[test]
    fn comments_are_keyed_by_entry() {
        let mut doc = Document::new();
        doc.insert_commented("timeout", json!(30), Some("units: ms"));
        doc.insert_commented("name", json!("svc"), None);

        assert_eq!(doc.comment("timeout"), Some("units: ms"));
        assert_eq!(doc.comment("name"), None);
    }

    #[test]
    fn clearing_a_comment() {
        let mut doc = Document::new();
        doc.insert_commented("timeout", json!(30), Some("units: ms"));
        doc.insert_commented("timeout", json!(30), None);
        assert_eq!(doc.comment("timeout"), None);
    }
}
