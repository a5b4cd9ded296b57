use crate::process::{ConfirmationToken, RelayError};
use thiserror::Error;

/// Errors surfaced to whoever dispatches review events
#[derive(Error, Debug)]
pub enum ReviewError {
    /// Approval attempted with unreviewed resources under the review-all policy
    #[error("{reviewed} of {total} resources reviewed; review all changes before approving")]
    PolicyViolation { reviewed: usize, total: usize },

    /// The answer could not be written to the waiting process
    #[error("failed to send '{token}' to the process: {source}")]
    RelayFailure {
        token: ConfirmationToken,
        #[source]
        source: RelayError,
    },

    /// A review is already in progress
    #[error("a review session is already active")]
    SessionActive,
}
