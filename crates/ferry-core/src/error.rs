//! Error types for the transfer core.
//!
//! Transfer failures ([`TransferError`]) are terminal for the operation that
//! produced them and are surfaced to the user; none are retried
//! automatically. Misuse of the executor's event protocol is reported
//! separately as [`ExecutorError`] since it indicates a driver bug rather than
//! a user-visible failure.

use thiserror::Error;

use crate::{blob::BlobRef, executor::TransferPhase, ids::ItemId};

/// Failures that end a send pass or a text send.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Local file content could not be read.
    #[error("could not read {name}: {reason}")]
    Read {
        /// File name.
        name: String,
        /// Underlying error description.
        reason: String,
    },

    /// File is too large to be carried in a single frame.
    #[error("{name} is too large to send ({size} bytes, max {max})")]
    TooLarge {
        /// File name.
        name: String,
        /// File size in bytes.
        size: usize,
        /// Largest payload a frame can carry.
        max: usize,
    },

    /// Channel refused the file frame.
    #[error("failed to send {name}")]
    SendRejected {
        /// File name.
        name: String,
    },

    /// Channel refused the text frame.
    #[error("failed to send message")]
    TextRejected,
}

impl TransferError {
    /// Returns true if the failure points at the peer link rather than at the
    /// local file.
    pub fn is_connection_issue(&self) -> bool {
        matches!(self, Self::SendRejected { .. } | Self::TextRejected)
    }
}

/// Events fed to the executor that do not match its current step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// Event does not correspond to the step the executor is waiting on.
    #[error("unexpected {event} for item {id} in phase {phase:?}")]
    UnexpectedEvent {
        /// Name of the offending event.
        event: &'static str,
        /// Item the event referred to.
        id: ItemId,
        /// Phase the executor was in.
        phase: TransferPhase,
    },

    /// Item of the current pass is no longer queued.
    #[error("item {0} is not queued")]
    UnknownItem(ItemId),
}

/// Blob table lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    /// Reference was released or belongs to another session.
    #[error("blob {0} is not available")]
    NotFound(BlobRef),
}

/// Platform clipboard failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// Clipboard (or the requested primitive) is not available.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    /// Write was attempted and failed.
    #[error("clipboard write failed: {0}")]
    Write(String),

    /// Reference could not be opened in a viewer.
    #[error("could not open viewer: {0}")]
    Open(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_failures_point_at_connection() {
        assert!(TransferError::SendRejected { name: "a.txt".into() }.is_connection_issue());
        assert!(TransferError::TextRejected.is_connection_issue());
    }

    #[test]
    fn local_failures_do_not_point_at_connection() {
        assert!(
            !TransferError::Read { name: "a.txt".into(), reason: "denied".into() }
                .is_connection_issue()
        );
        assert!(
            !TransferError::TooLarge { name: "a.iso".into(), size: 10, max: 5 }
                .is_connection_issue()
        );
    }

    #[test]
    fn rejected_send_names_file() {
        let message = TransferError::SendRejected { name: "a.txt".into() }.to_string();
        assert_eq!(message, "failed to send a.txt");
    }
}
