//! Built-in formats and the serializer trait

use std::sync::Arc;

use crate::document::Document;
use crate::error::Result;
use crate::handlers::{Json5Serializer, TomlSerializer, YamlSerializer};

/// Formats shipped with hotconf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Commented JSON superset. The only format that renders entry comments.
    Json5,
    Toml,
    Yaml,
}

impl Format {
    /// All built-in formats, in registration order
    pub const ALL: [Format; 3] = [Format::Json5, Format::Toml, Format::Yaml];

    /// Format used for paths without an extension
    pub const DEFAULT: Format = Format::Json5;

    /// Canonical format name, as used for registry lookup
    pub fn name(&self) -> &'static str {
        match self {
            Self::Json5 => "json5",
            Self::Toml => "toml",
            Self::Yaml => "yaml",
        }
    }

    /// Detect a built-in format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext.to_lowercase().as_str()))
    }

    /// File extensions that map to this format. The first one is canonical.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Json5 => &["json5", "json"],
            Self::Toml => &["toml"],
            Self::Yaml => &["yaml", "yml"],
        }
    }

    /// Whether encoded output carries entry comments
    pub fn supports_comments(&self) -> bool {
        matches!(self, Self::Json5)
    }

    /// Construct the default serializer for this format
    pub fn serializer(&self) -> Arc<dyn Serializer> {
        match self {
            Self::Json5 => Arc::new(Json5Serializer::new()),
            Self::Toml => Arc::new(TomlSerializer::new()),
            Self::Yaml => Arc::new(YamlSerializer::new()),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Encodes documents into a text format and decodes them back.
///
/// Implementations must be stateless from the caller's perspective: the
/// same serializer is shared between the foreground API and every watch
/// session.
pub trait Serializer: Send + Sync {
    /// Human-readable format name used in diagnostics
    fn name(&self) -> &str;

    /// Parse raw file content into a document.
    ///
    /// The root must be a mapping. Comments present in the source are
    /// discarded.
    fn decode(&self, source: &[u8]) -> Result<Document>;

    /// Render a document. Formats without comment syntax drop comments.
    fn encode(&self, document: &Document) -> Result<String>;
}
