use thiserror::Error;

/// Core error type for typesync operations.
#[derive(Error, Debug)]
pub enum TypesyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The metadata source itself is unusable; fatal for a run.
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Malformed attribute arguments or unresolvable references while
    /// building one type's declaration.
    #[error("Metadata extraction error: {0}")]
    MetadataExtraction(String),

    #[error("Classification gap: {0}")]
    ClassificationGap(String),

    #[error("Settings load error: {0}")]
    SettingsLoad(String),

    #[error("Duplicate output file {path}: already produced by {owner}")]
    DuplicateFile { path: String, owner: String },

    #[error("Generation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TypesyncError {
    fn from(e: serde_json::Error) -> Self {
        TypesyncError::Serialization(e.to_string())
    }
}

impl TypesyncError {
    /// Shorthand for a [`TypesyncError::MetadataExtraction`].
    pub fn extraction(msg: impl Into<String>) -> Self {
        TypesyncError::MetadataExtraction(msg.into())
    }
}

/// Result type alias using TypesyncError.
pub type Result<T> = std::result::Result<T, TypesyncError>;
