use std::collections::BTreeMap;

use pve_model::ValidationError;
use thiserror::Error;

/// The node did not accept a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The node answered and refused.
    ///
    /// `status` is the node's message exactly as sent. Per-field reasons the
    /// node attached are kept apart in `field_errors`; see [`Self::detail`].
    #[error("{status}")]
    Rejected {
        code: Option<u16>,
        status: String,
        field_errors: BTreeMap<String, String>,
    },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("request accepted but no task id was returned")]
    MissingHandle,
}

impl SubmissionError {
    pub fn rejected(code: Option<u16>, status: impl Into<String>) -> Self {
        SubmissionError::Rejected {
            code,
            status: status.into(),
            field_errors: BTreeMap::new(),
        }
    }

    /// Attach per-field reasons to a rejection; other variants are unchanged.
    pub fn with_field_errors(mut self, errors: BTreeMap<String, String>) -> Self {
        if let SubmissionError::Rejected { field_errors, .. } = &mut self {
            field_errors.extend(errors);
        }
        self
    }

    /// Status followed by one `field: reason` line per rejected field.
    pub fn detail(&self) -> String {
        let SubmissionError::Rejected {
            status,
            field_errors,
            ..
        } = self
        else {
            return self.to_string();
        };
        let mut text = status.clone();
        for (field, reason) in field_errors {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(field);
            text.push_str(": ");
            text.push_str(reason);
        }
        text
    }
}

/// A single status poll could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("status query failed: {0}")]
    Request(String),

    #[error("invalid status response: {0}")]
    InvalidResponse(String),

    #[error("task {0} names no node to query")]
    Unroutable(String),
}

/// Tracking ended without a confirmed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    /// The monitor lost contact; the task may still be running or may have finished.
    #[error("lost track of task {upid}; its outcome is unknown")]
    Unknown { upid: String },

    #[error("tracking of task {upid} was cancelled")]
    Cancelled { upid: String },

    #[error("tracking of task {upid} aborted: {reason}")]
    Aborted { upid: String, reason: String },
}

/// Why [`submit_and_track`](crate::TaskSupervisor::submit_and_track) did not start tracking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("another submission from this dialog is still in flight")]
    Busy,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
