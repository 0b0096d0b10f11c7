//! Error types for kgmeta.

use thiserror::Error;

/// Result type alias using kgmeta's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for kgmeta operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Draft not found in the draft store
    #[error("Draft not found: {0}")]
    DraftNotFound(uuid::Uuid),

    /// A user-facing editing error (format or cardinality)
    #[error(transparent)]
    Edit(#[from] EditError),

    /// Suggestion request could not be built or applied
    #[error("Suggestion error: {0}")]
    Suggestion(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Draft or submission storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

/// Recoverable editing errors shown next to the offending input.
///
/// The `Display` text is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("{label} does not accept multiple values")]
    NotMultiValue { label: &'static str },

    #[error("{label} is not a single-value field")]
    NotSingleValue { label: &'static str },

    /// The single-value field already holds a value.
    #[error("Only one value is allowed for {label}. Remove the existing value first.")]
    OnlyOneValue { label: &'static str },

    #[error("{label}: {message}")]
    InvalidFormat { label: String, message: String },

    #[error("Cannot add an empty {kind}")]
    EmptyEntity { kind: &'static str },

    #[error("Please fill in the required {kind} fields: {}", .fields.join(", "))]
    MissingEntityFields {
        kind: &'static str,
        fields: Vec<&'static str>,
    },

    #[error("No {kind} at position {index}")]
    IndexOutOfRange { kind: &'static str, index: usize },
}
