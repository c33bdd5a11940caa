//! Serializer seam for hotconf
//!
//! Provides the serializer-neutral [`Document`], the [`Serializer`] trait
//! and the default JSON5, TOML and YAML codecs, selected by format name
//! through a [`SerializerRegistry`].

pub mod document;
pub mod error;
pub mod format;
pub mod handlers;
pub mod registry;

pub use document::Document;
pub use error::{Error, Result};
pub use format::{Format, Serializer};
pub use handlers::{Json5Serializer, TomlSerializer, YamlSerializer};
pub use registry::SerializerRegistry;
