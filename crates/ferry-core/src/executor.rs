//! Transfer executor state machine.
//!
//! Drains the [`OutboundQueue`] one file at a time. The executor performs no
//! I/O: it emits [`TransferAction`]s (read this file, send this frame) and
//! consumes [`TransferEvent`]s reporting how they went. Each suspension point
//! of a send pass is therefore an explicit round trip through the driver.
//!
//! # State Machine
//!
//! ```text
//!            start()             ContentRead            SendCompleted(true)
//! ┌──────┐ ─────────> ┌─────────┐ ─────────> ┌─────────┐ ───────┐
//! │ Idle │            │ Reading │            │ Sending │        │ next item
//! └──────┘ <───────── └─────────┘            └─────────┘        │
//!    ↑  ↑   ReadFailed     ↑                      │             │
//!    │  └──────────────────┼──────────────────────┘ false       │
//!    │      (aborted)      └────────────────────────────────────┘
//!    └──── last item sent (finished)
//! ```
//!
//! # Invariants
//!
//! - At most one item is in flight, and items are sent in enqueue order.
//! - `completed <= total` at all times.
//! - Leaving Sending (finished or aborted) resets progress to 0/0.
//! - Unsent items, including the one that failed, stay queued after an abort.

use std::collections::VecDeque;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use ferry_proto::{MAX_FRAME_SIZE, TransferFrame};

use crate::{
    error::{ExecutorError, TransferError},
    ids::ItemId,
    queue::{FileHandle, OutboundItem, OutboundQueue},
};

/// Room left in a frame for field names and length headers.
const FRAME_OVERHEAD: usize = 4 * 1024;

/// Largest payload that still encodes within [`MAX_FRAME_SIZE`] next to the
/// frame's name and content type.
fn max_payload(frame: &TransferFrame) -> usize {
    let metadata = match frame {
        TransferFrame::File(file) => file.name.len() + file.content_type.len(),
        TransferFrame::Text(_) | TransferFrame::Unknown => 0,
    };
    MAX_FRAME_SIZE.saturating_sub(FRAME_OVERHEAD + metadata)
}

/// Where the executor is in a send pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    /// No pass in progress.
    Idle,
    /// Waiting for the content of this item.
    Reading(ItemId),
    /// Waiting for the channel to accept this item's frame.
    Sending(ItemId),
}

/// Completed/total counters of the current pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Items sent so far in this pass.
    pub completed: usize,
    /// Items in this pass.
    pub total: usize,
}

impl Progress {
    /// `completed / total * 100`, or 0 when no pass is running.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Results of driver work, fed back into the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    /// File content was read fully into memory.
    ContentRead {
        /// Item that was read.
        id: ItemId,
        /// File content.
        bytes: Bytes,
    },

    /// File content could not be read.
    ReadFailed {
        /// Item that failed.
        id: ItemId,
        /// Error description.
        reason: String,
    },

    /// Channel `send` returned for a file frame.
    SendCompleted {
        /// Item whose frame was handed to the channel.
        id: ItemId,
        /// `false` if the channel rejected the frame.
        accepted: bool,
    },

    /// Channel `send` returned for a text frame.
    TextSendCompleted {
        /// `false` if the channel rejected the frame.
        accepted: bool,
    },
}

/// Instructions produced by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferAction {
    /// Read the file fully into memory, then report
    /// [`TransferEvent::ContentRead`] or [`TransferEvent::ReadFailed`].
    ReadContent {
        /// Item to read.
        id: ItemId,
        /// Handle to read from.
        handle: FileHandle,
    },

    /// Hand a file frame to the channel, then report
    /// [`TransferEvent::SendCompleted`].
    Send {
        /// Item the frame was built from.
        id: ItemId,
        /// Frame to send.
        frame: TransferFrame,
    },

    /// Hand a text frame to the channel, then report
    /// [`TransferEvent::TextSendCompleted`].
    SendText {
        /// Frame to send.
        frame: TransferFrame,
    },

    /// An item was accepted by the channel.
    Progress {
        /// Item that was sent.
        id: ItemId,
        /// File name.
        name: String,
        /// Counters after this item.
        progress: Progress,
    },

    /// Pass completed with every item sent.
    Finished {
        /// Number of items sent.
        sent: usize,
    },

    /// Pass stopped at the first failure.
    Aborted {
        /// Why the pass stopped.
        error: TransferError,
        /// Items sent before the failure.
        sent: usize,
        /// Items left in the queue for a later retry.
        retained: usize,
    },

    /// Text frame accepted by the channel.
    TextSent,

    /// Text frame rejected by the channel.
    TextFailed {
        /// Failure to surface.
        error: TransferError,
    },
}

/// Sequential send-pass state machine.
///
/// Owns the outbound queue. Pure state machine: no I/O, fully testable.
#[derive(Debug, Clone)]
pub struct TransferExecutor {
    queue: OutboundQueue,
    phase: TransferPhase,
    /// Items of the current pass not yet started, in enqueue order.
    pending: VecDeque<ItemId>,
    progress: Progress,
}

impl Default for TransferExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferExecutor {
    /// Create an idle executor with an empty queue.
    pub fn new() -> Self {
        Self {
            queue: OutboundQueue::new(),
            phase: TransferPhase::Idle,
            pending: VecDeque::new(),
            progress: Progress::default(),
        }
    }

    /// Queue files for the next pass.
    ///
    /// Files queued while a pass is running are not part of that pass.
    pub fn enqueue(&mut self, handles: impl IntoIterator<Item = FileHandle>) -> Vec<ItemId> {
        let ids = self.queue.enqueue(handles);
        tracing::debug!(count = ids.len(), queued = self.queue.len(), "files queued");
        ids
    }

    /// Remove a queued file.
    ///
    /// Returns `false` if the item is absent, or if it belongs to the pass in
    /// progress (those are left alone until the pass ends).
    pub fn remove(&mut self, id: ItemId) -> bool {
        if self.is_part_of_pass(id) {
            tracing::warn!(%id, "refusing to remove an item of the running pass");
            return false;
        }
        self.queue.remove(id).is_some()
    }

    /// Begin a send pass over the current queue contents.
    ///
    /// No-op while a pass is already in flight. An empty queue finishes
    /// immediately with nothing sent.
    pub fn start(&mut self) -> Vec<TransferAction> {
        if self.in_flight() {
            tracing::debug!(phase = ?self.phase, "start ignored, pass already in flight");
            return vec![];
        }

        let snapshot = self.queue.drain_snapshot();
        if snapshot.is_empty() {
            return vec![TransferAction::Finished { sent: 0 }];
        }

        self.pending = snapshot.into_iter().map(|item| item.id).collect();
        self.progress = Progress { completed: 0, total: self.pending.len() };
        tracing::info!(total = self.progress.total, "send pass started");

        let mut actions = Vec::new();
        self.advance(&mut actions);
        actions
    }

    /// Build a text frame stamped `now` for immediate sending.
    ///
    /// Text bypasses the queue and never touches progress.
    pub fn send_text(&self, content: impl Into<String>, now: DateTime<Utc>) -> Vec<TransferAction> {
        vec![TransferAction::SendText { frame: TransferFrame::text(content, now) }]
    }

    /// Process the result of driver work.
    ///
    /// # Errors
    ///
    /// - `ExecutorError::UnexpectedEvent` if the event does not match the step
    ///   the executor is waiting on
    /// - `ExecutorError::UnknownItem` if the item left the queue mid-pass
    pub fn handle(&mut self, event: TransferEvent) -> Result<Vec<TransferAction>, ExecutorError> {
        match event {
            TransferEvent::ContentRead { id, bytes } => self.handle_content_read(id, bytes),
            TransferEvent::ReadFailed { id, reason } => {
                self.expect_phase("ReadFailed", id, TransferPhase::Reading(id))?;
                let name = self.item(id)?.handle.name().to_string();
                Ok(self.abort(TransferError::Read { name, reason }))
            },
            TransferEvent::SendCompleted { id, accepted } => {
                self.handle_send_completed(id, accepted)
            },
            TransferEvent::TextSendCompleted { accepted: true } => {
                Ok(vec![TransferAction::TextSent])
            },
            TransferEvent::TextSendCompleted { accepted: false } => {
                tracing::warn!("text frame rejected by channel");
                Ok(vec![TransferAction::TextFailed { error: TransferError::TextRejected }])
            },
        }
    }

    fn handle_content_read(
        &mut self,
        id: ItemId,
        bytes: Bytes,
    ) -> Result<Vec<TransferAction>, ExecutorError> {
        self.expect_phase("ContentRead", id, TransferPhase::Reading(id))?;
        let handle = self.item(id)?.handle.clone();

        let size = bytes.len();
        let frame = TransferFrame::file(handle.name(), handle.content_type(), bytes);
        let max = max_payload(&frame);
        if size > max {
            let error = TransferError::TooLarge { name: handle.name().to_string(), size, max };
            return Ok(self.abort(error));
        }

        self.phase = TransferPhase::Sending(id);

        Ok(vec![TransferAction::Send { id, frame }])
    }

    fn handle_send_completed(
        &mut self,
        id: ItemId,
        accepted: bool,
    ) -> Result<Vec<TransferAction>, ExecutorError> {
        self.expect_phase("SendCompleted", id, TransferPhase::Sending(id))?;

        if !accepted {
            let name = self.item(id)?.handle.name().to_string();
            tracing::warn!(%id, %name, "file frame rejected by channel");
            return Ok(self.abort(TransferError::SendRejected { name }));
        }

        let item = self.queue.remove(id).ok_or(ExecutorError::UnknownItem(id))?;
        self.progress.completed += 1;
        debug_assert!(self.progress.completed <= self.progress.total);

        tracing::debug!(
            %id,
            name = item.handle.name(),
            completed = self.progress.completed,
            total = self.progress.total,
            "file sent"
        );

        let mut actions = vec![TransferAction::Progress {
            id,
            name: item.handle.name().to_string(),
            progress: self.progress,
        }];
        self.advance(&mut actions);
        Ok(actions)
    }

    /// Start the next pending item, or finish the pass.
    fn advance(&mut self, actions: &mut Vec<TransferAction>) {
        if let Some(next) = self.pending.pop_front() {
            match self.queue.get(next) {
                Some(item) => {
                    self.phase = TransferPhase::Reading(next);
                    actions.push(TransferAction::ReadContent {
                        id: next,
                        handle: item.handle.clone(),
                    });
                },
                None => {
                    tracing::warn!(id = %next, "pass item vanished from queue, skipping");
                    self.progress.total = self.progress.total.saturating_sub(1);
                    self.advance(actions);
                },
            }
            return;
        }

        let sent = self.progress.completed;
        self.reset();
        tracing::info!(sent, "send pass finished");
        actions.push(TransferAction::Finished { sent });
    }

    fn abort(&mut self, error: TransferError) -> Vec<TransferAction> {
        let sent = self.progress.completed;
        self.reset();
        let retained = self.queue.len();

        tracing::warn!(%error, sent, retained, "send pass aborted");
        vec![TransferAction::Aborted { error, sent, retained }]
    }

    fn reset(&mut self) {
        self.phase = TransferPhase::Idle;
        self.pending.clear();
        self.progress = Progress::default();
    }

    fn expect_phase(
        &self,
        event: &'static str,
        id: ItemId,
        expected: TransferPhase,
    ) -> Result<(), ExecutorError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ExecutorError::UnexpectedEvent { event, id, phase: self.phase })
        }
    }

    fn item(&self, id: ItemId) -> Result<&OutboundItem, ExecutorError> {
        self.queue.get(id).ok_or(ExecutorError::UnknownItem(id))
    }

    fn is_part_of_pass(&self, id: ItemId) -> bool {
        match self.phase {
            TransferPhase::Idle => false,
            TransferPhase::Reading(current) | TransferPhase::Sending(current) => {
                current == id || self.pending.contains(&id)
            },
        }
    }

    /// A pass is in progress.
    pub fn in_flight(&self) -> bool {
        self.phase != TransferPhase::Idle
    }

    /// Current phase.
    pub fn phase(&self) -> TransferPhase {
        self.phase
    }

    /// Counters of the current pass (0/0 when idle).
    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// The outbound queue.
    pub fn queue(&self) -> &OutboundQueue {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor_with(names: &[&str]) -> (TransferExecutor, Vec<ItemId>) {
        let mut executor = TransferExecutor::new();
        let ids = executor
            .enqueue(names.iter().map(|n| FileHandle::from_bytes(*n, n.as_bytes().to_vec())));
        (executor, ids)
    }

    fn read(executor: &mut TransferExecutor, id: ItemId) -> Vec<TransferAction> {
        let bytes = Bytes::from(executor.queue().get(id).unwrap().handle.name().to_string());
        executor.handle(TransferEvent::ContentRead { id, bytes }).unwrap()
    }

    #[test]
    fn start_reads_first_item() {
        let (mut executor, ids) = executor_with(&["a", "b"]);
        let actions = executor.start();

        assert!(matches!(
            actions.as_slice(),
            [TransferAction::ReadContent { id, .. }] if *id == ids[0]
        ));
        assert_eq!(executor.phase(), TransferPhase::Reading(ids[0]));
        assert_eq!(executor.progress(), Progress { completed: 0, total: 2 });
    }

    #[test]
    fn start_while_in_flight_is_noop() {
        let (mut executor, _) = executor_with(&["a"]);
        let _ = executor.start();

        assert!(executor.start().is_empty());
    }

    #[test]
    fn empty_queue_finishes_immediately() {
        let mut executor = TransferExecutor::new();

        assert_eq!(executor.start(), vec![TransferAction::Finished { sent: 0 }]);
        assert!(!executor.in_flight());
    }

    #[test]
    fn content_read_builds_file_frame() {
        let mut executor = TransferExecutor::new();
        let ids = executor.enqueue([FileHandle::from_bytes("a.txt", b"hello".to_vec())
            .with_content_type("text/plain")]);
        let _ = executor.start();

        let actions = executor
            .handle(TransferEvent::ContentRead { id: ids[0], bytes: Bytes::from_static(b"hello") })
            .unwrap();

        let [TransferAction::Send { frame: TransferFrame::File(file), .. }] = actions.as_slice()
        else {
            panic!("expected a file frame, got {actions:?}");
        };
        assert_eq!(file.name, "a.txt");
        assert_eq!(file.size, 5);
        assert_eq!(file.content_type, "text/plain");
    }

    #[test]
    fn unknown_content_type_defaults_to_octet_stream() {
        let (mut executor, ids) = executor_with(&["blob"]);
        let _ = executor.start();

        let actions = read(&mut executor, ids[0]);
        let [TransferAction::Send { frame: TransferFrame::File(file), .. }] = actions.as_slice()
        else {
            panic!("expected a file frame");
        };
        assert_eq!(file.content_type, ferry_proto::DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn successful_pass_empties_queue_and_resets_progress() {
        let (mut executor, ids) = executor_with(&["a", "b"]);
        let _ = executor.start();

        let _ = read(&mut executor, ids[0]);
        let actions =
            executor.handle(TransferEvent::SendCompleted { id: ids[0], accepted: true }).unwrap();
        assert!(matches!(
            actions.as_slice(),
            [
                TransferAction::Progress { progress: Progress { completed: 1, total: 2 }, .. },
                TransferAction::ReadContent { .. }
            ]
        ));

        let _ = read(&mut executor, ids[1]);
        let actions =
            executor.handle(TransferEvent::SendCompleted { id: ids[1], accepted: true }).unwrap();
        assert!(matches!(
            actions.as_slice(),
            [TransferAction::Progress { .. }, TransferAction::Finished { sent: 2 }]
        ));

        assert!(executor.queue().is_empty());
        assert_eq!(executor.progress(), Progress::default());
        assert!(!executor.in_flight());
    }

    #[test]
    fn rejected_send_aborts_and_retains_unsent() {
        let (mut executor, ids) = executor_with(&["a", "b", "c"]);
        let _ = executor.start();

        let _ = read(&mut executor, ids[0]);
        let _ = executor.handle(TransferEvent::SendCompleted { id: ids[0], accepted: true });
        let _ = read(&mut executor, ids[1]);
        let actions =
            executor.handle(TransferEvent::SendCompleted { id: ids[1], accepted: false }).unwrap();

        assert_eq!(actions, vec![TransferAction::Aborted {
            error: TransferError::SendRejected { name: "b".into() },
            sent: 1,
            retained: 2,
        }]);
        assert!(!executor.in_flight());
        assert_eq!(executor.progress(), Progress::default());

        let remaining: Vec<ItemId> = executor.queue().items().iter().map(|i| i.id).collect();
        assert_eq!(remaining, vec![ids[1], ids[2]]);
    }

    #[test]
    fn read_failure_aborts() {
        let (mut executor, ids) = executor_with(&["a", "b"]);
        let _ = executor.start();

        let actions = executor
            .handle(TransferEvent::ReadFailed { id: ids[0], reason: "permission denied".into() })
            .unwrap();

        assert!(matches!(
            actions.as_slice(),
            [TransferAction::Aborted { error: TransferError::Read { .. }, sent: 0, retained: 2 }]
        ));
    }

    #[test]
    fn oversized_file_aborts_before_send() {
        let (mut executor, ids) = executor_with(&["huge.iso"]);
        let _ = executor.start();

        let bytes = Bytes::from(vec![0u8; MAX_FRAME_SIZE]);
        let actions = executor.handle(TransferEvent::ContentRead { id: ids[0], bytes }).unwrap();

        assert!(matches!(
            actions.as_slice(),
            [TransferAction::Aborted { error: TransferError::TooLarge { .. }, .. }]
        ));
    }

    #[test]
    fn long_metadata_counts_against_frame_size() {
        let payload = MAX_FRAME_SIZE - FRAME_OVERHEAD;
        let name = "n".repeat(2 * FRAME_OVERHEAD);
        let (mut executor, ids) = executor_with(&[name.as_str(), "fits.bin"]);
        let _ = executor.start();

        let bytes = Bytes::from(vec![0u8; payload]);
        let actions = executor.handle(TransferEvent::ContentRead { id: ids[0], bytes }).unwrap();
        let [TransferAction::Aborted { error: TransferError::TooLarge { size, max, .. }, .. }] =
            actions.as_slice()
        else {
            panic!("expected a size abort, got {actions:?}");
        };
        assert_eq!(*size, payload);
        assert!(*max < payload);
    }

    #[test]
    fn payload_at_limit_encodes_within_frame_size() {
        let (mut executor, ids) = executor_with(&["fits.bin"]);
        let _ = executor.start();

        let bytes = Bytes::from(vec![0u8; MAX_FRAME_SIZE - FRAME_OVERHEAD - 32]);
        let actions = executor.handle(TransferEvent::ContentRead { id: ids[0], bytes }).unwrap();
        let [TransferAction::Send { frame, .. }] = actions.as_slice() else {
            panic!("expected a send, got {actions:?}");
        };
        assert!(frame.to_bytes().is_ok());
    }

    #[test]
    fn mismatched_event_is_rejected() {
        let (mut executor, ids) = executor_with(&["a", "b"]);
        let _ = executor.start();

        let result = executor.handle(TransferEvent::SendCompleted { id: ids[0], accepted: true });
        assert!(matches!(result, Err(ExecutorError::UnexpectedEvent { .. })));

        let result =
            executor.handle(TransferEvent::ContentRead { id: ids[1], bytes: Bytes::new() });
        assert!(matches!(result, Err(ExecutorError::UnexpectedEvent { .. })));
    }

    #[test]
    fn items_of_running_pass_cannot_be_removed() {
        let (mut executor, ids) = executor_with(&["a", "b"]);
        let _ = executor.start();

        assert!(!executor.remove(ids[0]));
        assert!(!executor.remove(ids[1]));
        assert_eq!(executor.queue().len(), 2);
    }

    #[test]
    fn items_queued_mid_pass_wait_for_next_pass() {
        let (mut executor, ids) = executor_with(&["a"]);
        let _ = executor.start();
        let late = executor.enqueue([FileHandle::from_bytes("late", b"x".to_vec())]);

        let _ = read(&mut executor, ids[0]);
        let actions =
            executor.handle(TransferEvent::SendCompleted { id: ids[0], accepted: true }).unwrap();

        assert!(matches!(actions.last(), Some(TransferAction::Finished { sent: 1 })));
        assert_eq!(executor.queue().items()[0].id, late[0]);
        assert!(executor.remove(late[0]));
    }

    #[test]
    fn text_bypasses_queue_and_progress() {
        let (mut executor, _) = executor_with(&["a"]);
        let actions = executor.send_text("hello", Utc::now());

        assert!(matches!(actions.as_slice(), [TransferAction::SendText { .. }]));
        assert!(!executor.in_flight());

        let actions =
            executor.handle(TransferEvent::TextSendCompleted { accepted: false }).unwrap();
        assert_eq!(actions, vec![TransferAction::TextFailed {
            error: TransferError::TextRejected
        }]);
        assert_eq!(executor.queue().len(), 1);
        assert_eq!(executor.progress(), Progress::default());
    }

    #[test]
    fn percent_matches_counters() {
        assert_eq!(Progress { completed: 1, total: 4 }.percent(), 25.0);
        assert_eq!(Progress { completed: 4, total: 4 }.percent(), 100.0);
        assert_eq!(Progress::default().percent(), 0.0);
    }
}
