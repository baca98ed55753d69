//! Application state machine.
//!
//! This module defines the [`App`] state machine, which owns the transfer
//! executor and the inbound classifier and exposes everything a UI renders.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Queue management and send passes (through [`TransferExecutor`]).
//! - Classification of inbound frames into ledgers.
//! - Turning export requests into clipboard work and outcomes into
//!   notifications.
//! - Tracking link state and a short notification history for UI feedback.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use ferry_core::{
    BlobStore, Classified, ExportOutcome, FileHandle, InboundClassifier, ItemId, Ledger, Level,
    Notification, OutboundQueue, Progress, ReceivedFileRecord, ReceivedTextRecord, RecordId,
    TransferAction, TransferEvent, TransferExecutor,
};

use crate::{AppAction, AppEvent, ConnectionStatus, ExportTarget, FerryConfig};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable without a peer.
#[derive(Debug, Clone)]
pub struct App {
    /// Link state.
    connection: ConnectionStatus,
    /// Outbound queue and send pass.
    executor: TransferExecutor,
    /// Received files and texts.
    classifier: InboundClassifier,
    /// Recent notifications, oldest first.
    notifications: VecDeque<Notification>,
    /// Notifications kept in `notifications`.
    notification_history: usize,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create an App whose blob references are scoped to `scope`.
    pub fn new(config: &FerryConfig, scope: u64) -> Self {
        Self {
            connection: ConnectionStatus::Disconnected,
            executor: TransferExecutor::new(),
            classifier: InboundClassifier::new(scope, config.classifier()),
            notifications: VecDeque::new(),
            notification_history: config.notification_history,
            status_message: None,
        }
    }

    /// Process an event and return actions.
    ///
    /// `now` stamps text frames created by this event.
    pub fn handle(&mut self, event: AppEvent, now: DateTime<Utc>) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![AppAction::Render],
            AppEvent::ConnectionChanged(status) => {
                tracing::info!(%status, "connection changed");
                self.status_message = Some(status.to_string());
                self.connection = status;
                vec![AppAction::Render]
            },
            AppEvent::FilesSelected { handles } => self.enqueue_files(handles),
            AppEvent::RemoveQueued { id } => self.remove_queued(id),
            AppEvent::StartTransfer => self.start_transfer(),
            AppEvent::SendText { content } => self.send_text(content, now),
            AppEvent::ExportImage { record } => self.export_image(record),
            AppEvent::ExportText { record } => self.export_text(record),
            AppEvent::FrameReceived(frame) => match self.classifier.on_frame(frame) {
                Some(classified) => vec![AppAction::Received(classified), AppAction::Render],
                None => vec![],
            },
            AppEvent::Transfer(event) => self.handle_transfer(event),
            AppEvent::ExportCompleted { target, outcome } => {
                self.export_completed(&target, &outcome)
            },
            AppEvent::Quit => self.quit(),
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Queue files for sending.
    pub fn enqueue_files(&mut self, handles: Vec<FileHandle>) -> Vec<AppAction> {
        if handles.is_empty() {
            return vec![];
        }
        let ids = self.executor.enqueue(handles);
        self.status_message = Some(match ids.len() {
            1 => "1 file queued".to_string(),
            n => format!("{n} files queued"),
        });
        vec![AppAction::Render]
    }

    /// Remove a queued file.
    pub fn remove_queued(&mut self, id: ItemId) -> Vec<AppAction> {
        if !self.executor.remove(id) {
            self.status_message = Some(format!("Cannot remove #{id}"));
        }
        vec![AppAction::Render]
    }

    /// Send every queued file, in order, stopping at the first failure.
    ///
    /// No-op while a pass is in flight.
    pub fn start_transfer(&mut self) -> Vec<AppAction> {
        if self.executor.in_flight() {
            self.status_message = Some("Transfer already in progress".to_string());
            return vec![AppAction::Render];
        }
        let actions = self.executor.start();
        self.translate(actions)
    }

    /// Send a text message immediately, bypassing the queue.
    pub fn send_text(&mut self, content: String, now: DateTime<Utc>) -> Vec<AppAction> {
        if content.is_empty() {
            self.status_message = Some("Empty message not sent".to_string());
            return vec![AppAction::Render];
        }
        let actions = self.executor.send_text(content, now);
        self.translate(actions)
    }

    /// Copy a received file to the clipboard.
    pub fn export_image(&mut self, record: RecordId) -> Vec<AppAction> {
        let Some(file) = self.classifier.files().get(record) else {
            return self.notify(Notification::new(
                Level::Error,
                format!("no received file #{record}"),
            ));
        };

        let name = file.name.clone();
        vec![AppAction::ExportImage {
            target: ExportTarget::Image { record, name: name.clone() },
            reference: file.reference,
            name,
        }]
    }

    /// Copy a received text to the clipboard.
    pub fn export_text(&mut self, record: RecordId) -> Vec<AppAction> {
        let Some(text) = self.classifier.texts().get(record) else {
            return self.notify(Notification::new(
                Level::Error,
                format!("no received message #{record}"),
            ));
        };

        vec![AppAction::ExportText {
            target: ExportTarget::Text { record },
            content: text.content.clone(),
        }]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Session teardown: release every received blob.
    pub fn clear_received(&mut self) -> Vec<AppAction> {
        self.classifier.clear();
        vec![AppAction::Render]
    }

    fn handle_transfer(&mut self, event: TransferEvent) -> Vec<AppAction> {
        match self.executor.handle(event) {
            Ok(actions) => self.translate(actions),
            Err(e) => {
                tracing::warn!(error = %e, "transfer event rejected");
                vec![]
            },
        }
    }

    fn export_completed(
        &mut self,
        target: &ExportTarget,
        outcome: &ExportOutcome,
    ) -> Vec<AppAction> {
        let notification = match target {
            ExportTarget::Image { name, .. } => Notification::image_export(outcome, name),
            ExportTarget::Text { .. } => Notification::text_export(outcome),
        };
        self.notify(notification)
    }

    /// Map executor actions onto app actions, recording notifications.
    fn translate(&mut self, actions: Vec<TransferAction>) -> Vec<AppAction> {
        let mut out = Vec::with_capacity(actions.len());
        for action in actions {
            match action {
                TransferAction::ReadContent { id, handle } => {
                    out.push(AppAction::ReadFile { id, handle });
                },
                TransferAction::Send { id, frame } => out.push(AppAction::SendFile { id, frame }),
                TransferAction::SendText { frame } => out.push(AppAction::SendText { frame }),
                TransferAction::Progress { name, progress, .. } => {
                    out.extend(self.notify(Notification::sent(&name, progress)));
                },
                TransferAction::Finished { sent } => {
                    out.extend(self.notify(Notification::finished(sent)));
                },
                TransferAction::Aborted { error, retained, .. } => {
                    out.extend(self.notify(Notification::aborted(&error, retained)));
                },
                TransferAction::TextSent => out.extend(self.notify(Notification::text_sent())),
                TransferAction::TextFailed { error } => {
                    out.extend(self.notify(Notification::from(&error)));
                },
            }
        }
        out
    }

    fn notify(&mut self, notification: Notification) -> Vec<AppAction> {
        self.status_message = Some(notification.message.clone());
        if self.notification_history > 0 {
            if self.notifications.len() >= self.notification_history {
                self.notifications.pop_front();
            }
            self.notifications.push_back(notification.clone());
        }
        vec![AppAction::Notify(notification), AppAction::Render]
    }

    /// Current link state.
    pub fn connection_status(&self) -> &ConnectionStatus {
        &self.connection
    }

    /// Files waiting to be sent.
    pub fn queue(&self) -> &OutboundQueue {
        self.executor.queue()
    }

    /// Counters of the running pass (0/0 when idle).
    pub fn progress(&self) -> Progress {
        self.executor.progress()
    }

    /// Progress of the running pass as a percentage.
    pub fn progress_percent(&self) -> f64 {
        self.executor.progress().percent()
    }

    /// A send pass is in progress.
    pub fn in_flight(&self) -> bool {
        self.executor.in_flight()
    }

    /// Received files, in arrival order.
    pub fn files(&self) -> &Ledger<ReceivedFileRecord> {
        self.classifier.files()
    }

    /// Received texts, in arrival order.
    pub fn texts(&self) -> &Ledger<ReceivedTextRecord> {
        self.classifier.texts()
    }

    /// Blob table backing received files.
    pub fn blobs(&self) -> &BlobStore {
        self.classifier.blobs()
    }

    /// Recent notifications, oldest first.
    pub fn notifications(&self) -> impl DoubleEndedIterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// One-line summary of a ledger entry. `None` if it was evicted.
    pub fn describe(&self, classified: Classified) -> Option<String> {
        match classified {
            Classified::File(id) => {
                self.files().get(id).map(|f| format!("{} ({} bytes)", f.name, f.size))
            },
            Classified::Text(id) => self.texts().get(id).map(|t| t.content.clone()),
        }
    }
}
