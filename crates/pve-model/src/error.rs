use thiserror::Error;

use crate::MalformedPropertyError;

/// Rejection of user input before anything is sent to a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    Missing(&'static str),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },

    #[error(transparent)]
    Malformed(#[from] MalformedPropertyError),
}

impl ValidationError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
