//! Error types and validation failure codes for PULSE.

use thiserror::Error;

/// Per-step validation failures. Each code corresponds to the re-prompt
/// the engine sends without changing the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
    /// Category input does not match any catalog label.
    UnknownCategory,
    /// Location step received no text or an empty string.
    EmptyLocation,
    /// Price input is not a plain string of decimal digits.
    NonNumericPrice,
    /// Photo step received neither a photo nor the skip button.
    PhotoOrSkipExpected,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCategory => write!(f, "unknown_category"),
            Self::EmptyLocation => write!(f, "empty_location"),
            Self::NonNumericPrice => write!(f, "non_numeric_price"),
            Self::PhotoOrSkipExpected => write!(f, "photo_or_skip_expected"),
        }
    }
}

/// PULSE errors.
#[derive(Debug, Error)]
pub enum PulseError {
    /// User input does not satisfy the current step's contract.
    #[error("validation error: {0}")]
    Validation(ValidationFailure),

    /// The backend store rejected a write. The detail string is shown to
    /// the user verbatim.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Protocol-level error (malformed frame, impossible session state).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Transport error (connection, I/O).
    #[error("transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ValidationFailure> for PulseError {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure)
    }
}

/// Result type alias for PULSE operations.
pub type PulseResult<T> = Result<T, PulseError>;
