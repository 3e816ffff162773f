use crate::host::HostError;
use crate::model::EntryId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblerError {
    #[error("Unsupported attribute kind '{kind}' on {attribute}")]
    UnsupportedAttributeKind { attribute: String, kind: String },

    #[error("Failed to extract {attribute}: {source}")]
    ExtractionFailure {
        attribute: String,
        #[source]
        source: HostError,
    },

    #[error("Moving entry {entry} under {target} would create a cycle")]
    CycleDetected { entry: EntryId, target: EntryId },

    #[error("Serialization error at {path}: {message}")]
    Serialization { path: String, message: String },

    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    #[error("Parent entry not found: {0}")]
    ParentNotFound(EntryId),

    #[error("Value of '{0}' is bound to the host and cannot be edited")]
    ImmutableValue(String),

    #[error("A valid name must be provided")]
    InvalidTitle,

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Tab not found: {0}")]
    TabNotFound(usize),

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl AssemblerError {
    /// True for failures that only concern a single attribute and should be
    /// skipped rather than abort the surrounding operation.
    pub fn is_attribute_local(&self) -> bool {
        matches!(
            self,
            AssemblerError::UnsupportedAttributeKind { .. }
                | AssemblerError::ExtractionFailure { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AssemblerError>;
