//! Error types for hotconf-format

/// Result type for hotconf-format operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding or decoding documents
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to decode {format} content: {message}")]
    Decode { format: String, message: String },

    #[error("Failed to encode {format} content: {message}")]
    Encode { format: String, message: String },
}

impl Error {
    pub fn decode(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn encode(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            format: format.into(),
            message: message.into(),
        }
    }
}
