//! Errors raised by the batch sender.

use crate::wire::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The entry lacks a required parameter. Raised before buffering.
    #[error("missing required parameter for {object}: {field}")]
    MissingField {
        object: &'static str,
        field: &'static str,
    },

    /// The queue rejected an entry for a caller-caused reason.
    /// Carries the first offending entry in submission order.
    #[error("{operation} rejected entry {id}: {code}: {message}")]
    RemoteRejection {
        operation: &'static str,
        id: String,
        code: String,
        message: String,
    },

    /// A failure record without a fault classification.
    #[error("failure for entry {id} carries no SenderFault classification")]
    Unclassified { id: String },

    /// The batch call itself failed. Entries of that attempt are not re-queued.
    #[error("batch send failed: {0}")]
    Transport(#[source] TransportError),
}

impl SendError {
    /// The rejection code, if this is a remote rejection.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::RemoteRejection { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_remote_rejection(&self) -> bool {
        matches!(self, Self::RemoteRejection { .. })
    }
}
