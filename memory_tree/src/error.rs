//! Error types for slot-store operations.

use thiserror::Error;

/// Errors raised by the memory tree state core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The slot store was used before it held any slots.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// What was wrong with the store at the time of the call
        reason: String,
    },
}

impl TreeError {
    pub(crate) fn invalid_state(reason: impl Into<String>) -> Self {
        TreeError::InvalidState { reason: reason.into() }
    }
}
