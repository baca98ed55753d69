//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, io};

use bytes::Bytes;
use ferry_core::{Classified, Clipboard, FileHandle, Notification};
use ferry_proto::TransferFrame;

use crate::{App, AppEvent, ConnectionStatus};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal UI and in tests.
///
/// # Implementations
///
/// - **TUI**: crossterm for input, ratatui for rendering, TCP for the peer
///   link, the system clipboard
/// - **Tests**: scripted events and an in-memory channel
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Clipboard used for exports.
    type Clipboard: Clipboard;

    /// Wait for the next input event.
    ///
    /// User intents and frames received from the peer come through this one
    /// stream, in the order they happened. Returns `None` once input is
    /// closed.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Read a file fully into memory.
    fn read_file(&mut self, handle: &FileHandle) -> impl Future<Output = io::Result<Bytes>> + Send;

    /// Hand a frame to the peer channel.
    ///
    /// Returns `false` if the channel rejected it. Never retried.
    fn send_frame(&mut self, frame: &TransferFrame) -> impl Future<Output = bool> + Send;

    /// Current link state.
    fn connection_status(&self) -> ConnectionStatus;

    /// Platform clipboard.
    fn clipboard(&mut self) -> &mut Self::Clipboard;

    /// A frame was recorded in one of the app's ledgers.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot handle the record.
    fn received(
        &mut self,
        app: &App,
        classified: Classified,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Show a notification.
    fn notify(&mut self, notification: &Notification);

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Stop the link and clean up resources.
    fn stop(&mut self);
}
