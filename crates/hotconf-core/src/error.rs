//! Error types for hotconf-core

use std::path::PathBuf;

/// Result type for hotconf-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while binding, loading, saving or watching
/// configuration files
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Schema descriptor is invalid
    #[error("Invalid schema {schema}: {message}")]
    Schema { schema: String, message: String },

    /// No serializer registered for the resolved format
    #[error("Unsupported config format '{format}' for {path}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File content does not parse under its format
    #[error("Failed to decode {format} config at {path}: {message}")]
    Decode {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Document could not be rendered in the target format
    #[error("Failed to encode {format} config for {path}: {message}")]
    Encode {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// A value cannot be converted to its entry's declared type
    #[error("Cannot bind entry '{entry}': {message}")]
    Binding { entry: String, message: String },

    /// Entry name is not part of the schema
    #[error("Schema {schema} has no entry named '{entry}'")]
    UnknownEntry { schema: String, entry: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File watch could not be registered or was lost
    #[error("Failed to watch {path}: {message}")]
    Watch { path: PathBuf, message: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn schema(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            schema: schema.into(),
            message: message.into(),
        }
    }

    pub fn binding(entry: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Binding {
            entry: entry.into(),
            message: message.into(),
        }
    }

    /// Attach a path to a serializer error
    pub(crate) fn from_format(path: impl Into<PathBuf>, err: hotconf_format::Error) -> Self {
        let path = path.into();
        match err {
            hotconf_format::Error::UnsupportedFormat { format } => {
                Self::UnsupportedFormat { path, format }
            }
            hotconf_format::Error::Decode { format, message } => Self::Decode {
                path,
                format,
                message,
            },
            hotconf_format::Error::Encode { format, message } => Self::Encode {
                path,
                format,
                message,
            },
        }
    }
}
