//! Fuzz target for the TransferExecutor state machine
//!
//! Drive the executor with arbitrary interleavings of queue edits, pass
//! starts and driver results.
//!
//! # Strategy
//!
//! - Queue edits: enqueue batches, remove by position (also mid-pass)
//! - Driver results: read ok/failed, send accepted/rejected
//! - Stray events: results for items that never existed
//!
//! # Invariants
//!
//! - At most one item in flight; in flight iff a driver result is awaited
//! - `completed <= total` at all times
//! - Files are sent in strictly increasing identifier order (enqueue order)
//! - An abort retains the failing item
//! - Stray events are rejected, never panic

#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use ferry_core::{FileHandle, ItemId, TransferAction, TransferEvent, TransferExecutor};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum ExecutorOp {
    Enqueue { count: u8 },
    Remove { index: u8 },
    Start,
    Respond { ok: bool },
    Stray { id: u8, accepted: bool },
}

fuzz_target!(|ops: Vec<ExecutorOp>| {
    let mut executor = TransferExecutor::new();
    let mut awaiting: Option<TransferAction> = None;
    let mut last_sent: Option<ItemId> = None;

    for op in ops {
        let actions = match op {
            ExecutorOp::Enqueue { count } => {
                let handles = (0..count % 8).map(|i| FileHandle::from_bytes(format!("f{i}"), vec![i]));
                executor.enqueue(handles);
                vec![]
            }
            ExecutorOp::Remove { index } => {
                if let Some(item) = executor.queue().items().get(index as usize).cloned() {
                    executor.remove(item.id);
                }
                vec![]
            }
            ExecutorOp::Start => executor.start(),
            ExecutorOp::Respond { ok } => match awaiting.take() {
                Some(TransferAction::ReadContent { id, handle }) => {
                    let event = if ok {
                        TransferEvent::ContentRead { id, bytes: Bytes::from(handle.name().to_owned()) }
                    } else {
                        TransferEvent::ReadFailed { id, reason: "fuzz".into() }
                    };
                    executor.handle(event).expect("awaited read result rejected")
                }
                Some(TransferAction::Send { id, .. }) => executor
                    .handle(TransferEvent::SendCompleted { id, accepted: ok })
                    .expect("awaited send result rejected"),
                _ => vec![],
            },
            ExecutorOp::Stray { id, accepted } => {
                let id = ItemId::new(u64::MAX - u64::from(id));
                let result = executor.handle(TransferEvent::SendCompleted { id, accepted });
                assert!(result.is_err(), "stray event accepted");
                vec![]
            }
        };

        for action in actions {
            match action {
                TransferAction::ReadContent { .. } | TransferAction::Send { .. } => {
                    assert!(awaiting.is_none(), "two items in flight");
                    awaiting = Some(action);
                }
                TransferAction::Progress { id, progress, .. } => {
                    assert!(progress.completed <= progress.total);
                    if let Some(last) = last_sent {
                        assert!(id > last, "sent out of order: {id} after {last}");
                    }
                    last_sent = Some(id);
                    assert!(executor.queue().get(id).is_none(), "sent item still queued");
                }
                TransferAction::Aborted { retained, .. } => {
                    assert!(retained >= 1, "abort dropped the failing item");
                    assert_eq!(retained, executor.queue().len());
                }
                _ => {}
            }
        }

        let progress = executor.progress();
        assert!(progress.completed <= progress.total);
        assert_eq!(executor.in_flight(), awaiting.is_some());
    }
});
