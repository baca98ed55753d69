//! Simulation driver shared by the runtime tests.
//!
//! `SimDriver` implements [`Driver`] over scripted events and an in-memory
//! channel so the production [`ferry_app::Runtime`] can be exercised without a
//! peer, a terminal or a clipboard. All state lives behind an
//! `Arc<Mutex<_>>`; clones share it, so a test keeps a handle while the
//! runtime owns the driver.

#![allow(dead_code, clippy::unwrap_used)]

use std::{
    collections::{HashSet, VecDeque},
    io,
    sync::{Arc, Mutex},
};

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use ferry_app::{App, AppEvent, ConnectionStatus, Driver, read_handle};
use ferry_core::{
    Blob, BlobRef, Classified, Clipboard, ClipboardCapabilities, ClipboardError, Environment,
    FileHandle, Notification,
};
use ferry_proto::TransferFrame;

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    sent: Vec<TransferFrame>,
    send_attempts: usize,
    reject_send: Option<usize>,
    unreadable: HashSet<String>,
    connection: ConnectionStatus,
    notifications: Vec<Notification>,
    received: Vec<String>,
    clipboard_binary: Vec<Blob>,
    clipboard_text: Vec<String>,
    viewed: Vec<String>,
    renders: usize,
    stopped: bool,
}

/// Clipboard backed by the shared simulation state.
#[derive(Clone)]
pub struct SimClipboard {
    state: Arc<Mutex<SharedState>>,
    capabilities: ClipboardCapabilities,
}

impl Clipboard for SimClipboard {
    fn capabilities(&self) -> ClipboardCapabilities {
        self.capabilities
    }

    async fn write_binary(&mut self, blob: &Blob) -> Result<(), ClipboardError> {
        if !blob.is_image() {
            return Err(ClipboardError::Write(format!("unsupported {}", blob.content_type)));
        }
        self.state.lock().unwrap().clipboard_binary.push(blob.clone());
        Ok(())
    }

    async fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.state.lock().unwrap().clipboard_text.push(text.to_string());
        Ok(())
    }

    async fn open_viewer(
        &mut self,
        _reference: &BlobRef,
        _blob: &Blob,
        name: &str,
    ) -> Result<(), ClipboardError> {
        self.state.lock().unwrap().viewed.push(name.to_string());
        Ok(())
    }
}

/// Simulation driver for deterministic testing.
#[derive(Clone)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    clipboard: SimClipboard,
}

impl SimDriver {
    /// Connected driver with a full clipboard.
    pub fn new() -> Self {
        Self::with_clipboard(ClipboardCapabilities::FULL)
    }

    /// Connected driver with the given clipboard capabilities.
    pub fn with_clipboard(capabilities: ClipboardCapabilities) -> Self {
        let state = Arc::new(Mutex::new(SharedState {
            connection: ConnectionStatus::Connected { peer: "sim".into() },
            ..Default::default()
        }));
        let clipboard = SimClipboard { state: Arc::clone(&state), capabilities };
        Self { state, clipboard }
    }

    pub fn inject_event(&self, event: AppEvent) {
        self.state.lock().unwrap().pending_events.push_back(event);
    }

    /// Reject the send attempt with this zero-based index.
    pub fn reject_send(&self, attempt: usize) {
        self.state.lock().unwrap().reject_send = Some(attempt);
    }

    /// Make reads of the named file fail.
    pub fn make_unreadable(&self, name: &str) {
        self.state.lock().unwrap().unreadable.insert(name.to_string());
    }

    pub fn set_connection(&self, status: ConnectionStatus) {
        self.state.lock().unwrap().connection = status;
    }

    pub fn sent(&self) -> Vec<TransferFrame> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn sent_names(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|frame| match frame {
                TransferFrame::File(file) => Some(file.name),
                _ => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.lock().unwrap().notifications.clone()
    }

    pub fn received(&self) -> Vec<String> {
        self.state.lock().unwrap().received.clone()
    }

    pub fn clipboard_binary(&self) -> Vec<Blob> {
        self.state.lock().unwrap().clipboard_binary.clone()
    }

    pub fn clipboard_text(&self) -> Vec<String> {
        self.state.lock().unwrap().clipboard_text.clone()
    }

    pub fn viewed(&self) -> Vec<String> {
        self.state.lock().unwrap().viewed.clone()
    }

    pub fn renders(&self) -> usize {
        self.state.lock().unwrap().renders
    }

    pub fn stopped(&self) -> bool {
        self.state.lock().unwrap().stopped
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Clipboard = SimClipboard;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.state.lock().unwrap().pending_events.pop_front())
    }

    async fn read_file(&mut self, handle: &FileHandle) -> io::Result<Bytes> {
        if self.state.lock().unwrap().unreadable.contains(handle.name()) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
        }
        read_handle(handle).await
    }

    async fn send_frame(&mut self, frame: &TransferFrame) -> bool {
        let mut state = self.state.lock().unwrap();
        let attempt = state.send_attempts;
        state.send_attempts += 1;

        if !state.connection.is_connected() || state.reject_send == Some(attempt) {
            return false;
        }
        state.sent.push(frame.clone());
        true
    }

    fn connection_status(&self) -> ConnectionStatus {
        self.state.lock().unwrap().connection.clone()
    }

    fn clipboard(&mut self) -> &mut Self::Clipboard {
        &mut self.clipboard
    }

    async fn received(&mut self, app: &App, classified: Classified) -> Result<(), Self::Error> {
        let summary = app
            .describe(classified)
            .ok_or_else(|| SimDriverError(format!("no record for {classified:?}")))?;
        self.state.lock().unwrap().received.push(summary);
        Ok(())
    }

    fn notify(&mut self, notification: &Notification) {
        self.state.lock().unwrap().notifications.push(notification.clone());
    }

    fn render(&mut self, _app: &App) -> Result<(), Self::Error> {
        self.state.lock().unwrap().renders += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.state.lock().unwrap().stopped = true;
    }
}

/// Environment with a pinned clock.
#[derive(Debug, Clone, Copy)]
pub struct FixedEnv {
    pub now: DateTime<Utc>,
}

impl FixedEnv {
    pub fn new() -> Self {
        Self { now: Utc.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap() }
    }
}

impl Environment for FixedEnv {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        buffer.fill(0x5a);
    }
}

pub fn memory_files(names: &[&str]) -> Vec<FileHandle> {
    names.iter().map(|name| FileHandle::from_bytes(*name, name.as_bytes().to_vec())).collect()
}
