//! Error types for the costumier correlation engine.
//!
//! Structured errors via thiserror. Only the descriptor parser can fail;
//! the correlation engines have no failure states: an unmatched descriptor
//! is a legitimate result, not an error.

use thiserror::Error;

/// Main error type for costumier operations.
#[derive(Debug, Error)]
pub enum CostumierError {
    /// Descriptor header fields produce out-of-bounds offsets or the
    /// declared counts overflow the buffer. Fatal for that one descriptor;
    /// the caller decides whether to skip it or halt the archive scan.
    #[error("malformed descriptor at offset {offset:#x}: {message}")]
    MalformedDescriptor { offset: usize, message: String },

    /// Invalid input data outside the descriptor container itself.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for costumier operations.
pub type Result<T> = std::result::Result<T, CostumierError>;

impl CostumierError {
    pub(crate) fn malformed(offset: usize, message: impl Into<String>) -> Self {
        CostumierError::MalformedDescriptor {
            offset,
            message: message.into(),
        }
    }
}
