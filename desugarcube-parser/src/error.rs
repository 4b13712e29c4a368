//! Error types for story conversion

use std::path::PathBuf;

/// Errors that abort a conversion.
///
/// Every variant is terminal: nothing is written when one of them surfaces.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The source path does not reference an existing regular file
    #[error("File does not exist at: {}", .0.display())]
    MissingInput(PathBuf),

    /// An expression line in a passage head has no non-empty value
    #[error("Found unbound expression: {0}")]
    UnboundExpression(String),

    /// A link label matches zero or several passage names
    #[error("Found unbound link: {0}")]
    UnboundLink(String),

    /// The tag stream could not be read as a story document
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConvertError {
    /// Wrap an I/O failure together with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate
pub type ConvertResult<T> = Result<T, ConvertError>;
