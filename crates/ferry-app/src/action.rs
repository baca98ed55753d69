//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use ferry_core::{BlobRef, Classified, FileHandle, ItemId, Notification};
use ferry_proto::TransferFrame;

use crate::ExportTarget;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Read a queued file into memory.
    ReadFile {
        /// Queued item.
        id: ItemId,
        /// File to read.
        handle: FileHandle,
    },

    /// Hand a file frame to the channel.
    SendFile {
        /// Queued item the frame was built from.
        id: ItemId,
        /// Frame to send.
        frame: TransferFrame,
    },

    /// Hand a text frame to the channel.
    SendText {
        /// Frame to send.
        frame: TransferFrame,
    },

    /// Copy a received blob to the clipboard.
    ExportImage {
        /// File record being exported.
        target: ExportTarget,
        /// Published reference of the blob.
        reference: BlobRef,
        /// File name shown in the viewer fallback.
        name: String,
    },

    /// Copy text to the clipboard.
    ExportText {
        /// Text record being exported.
        target: ExportTarget,
        /// Message content.
        content: String,
    },

    /// Show a notification.
    Notify(Notification),

    /// A frame was recorded in a ledger.
    Received(Classified),
}
