use thiserror::Error;

/// Result type for deploytrace operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the source, engine and CLI layers
///
/// Provisioning failures of deployments or resources are never reported
/// through this type; they are carried as data on the tree.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure talking to the deployment source
    #[error("HTTP error: {0}")]
    Http(String),

    /// The deployment source answered with a non-success status
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// Credential acquisition failed
    #[error("Credential error: {0}")]
    Credential(String),

    /// A record is missing a field the timeline cannot be built without
    #[error("{entity} is missing required field '{field}'")]
    MissingField { entity: String, field: &'static str },

    /// Duration string is not ISO-8601
    #[error("Invalid ISO-8601 duration: {0}")]
    InvalidDuration(String),

    /// Resource identifier does not have the expected ARM shape
    #[error("Invalid resource id: {0}")]
    InvalidResourceId(String),

    /// JSON decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The walk was interrupted before completion
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    pub fn missing(entity: impl Into<String>, field: &'static str) -> Self {
        Error::MissingField {
            entity: entity.into(),
            field,
        }
    }

    /// Whether retrying the same idempotent request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(_) => true,
            Error::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
