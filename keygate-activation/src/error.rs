//! Error types for key activation.

use thiserror::Error;

/// Activation-specific errors.
#[derive(Debug, Error)]
pub enum ActivationError {
    /// Key or identifier was absent or empty.
    #[error("missing UUID or key")]
    MissingField,

    /// Key is already bound to a different identifier.
    #[error("key already bound to a different identifier")]
    KeyAlreadyBound,

    /// Key is not on the authority list.
    #[error("key not on authority list")]
    KeyNotAuthorized,

    /// The authority list could not be fetched.
    #[error("authority list unavailable: {0}")]
    AuthorityUnavailable(String),

    /// No binding exists for the key.
    #[error("key not found")]
    KeyNotFound,

    /// Store file could not be read or written.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store file is not a valid binding map.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

impl ActivationError {
    /// Returns the HTTP status code this error maps to.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingField => 400,
            Self::KeyAlreadyBound => 403,
            Self::KeyNotAuthorized | Self::KeyNotFound => 404,
            Self::AuthorityUnavailable(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Storage(_) => 500,
        }
    }

    /// Returns true if the caller, not the service, is at fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

/// Result type for activation operations.
pub type ActivationResult<T> = Result<T, ActivationError>;
