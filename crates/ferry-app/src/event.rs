//! Application input events.
//!
//! This module defines [`AppEvent`], the inputs that drive the [`crate::App`]
//! state machine.
//!
//! Events originate from three sources:
//! - User intents (queue files, send, copy) polled from the driver.
//! - Frames received from the peer, delivered through the same stream so
//!   arrival order is preserved.
//! - Results of work the runtime performed on the app's behalf.

use ferry_core::{ExportOutcome, FileHandle, ItemId, RecordId, TransferEvent};
use ferry_proto::TransferFrame;

use crate::{ConnectionStatus, ExportTarget};

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic tick or local input change; redraws the view.
    Tick,

    /// Driver reported a link state change.
    ConnectionChanged(ConnectionStatus),

    /// User picked files to send.
    FilesSelected {
        /// Picked files, in selection order.
        handles: Vec<FileHandle>,
    },

    /// User removed a queued file.
    RemoveQueued {
        /// Queued item.
        id: ItemId,
    },

    /// User asked to send the queue.
    StartTransfer,

    /// User typed a message.
    SendText {
        /// Message content.
        content: String,
    },

    /// User asked to copy a received file.
    ExportImage {
        /// File record.
        record: RecordId,
    },

    /// User asked to copy a received text.
    ExportText {
        /// Text record.
        record: RecordId,
    },

    /// Frame received from the peer.
    FrameReceived(TransferFrame),

    /// Result of a read or send performed for the executor.
    Transfer(TransferEvent),

    /// Result of a clipboard export.
    ExportCompleted {
        /// What was exported.
        target: ExportTarget,
        /// How it went.
        outcome: ExportOutcome,
    },

    /// Quit requested.
    Quit,

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
