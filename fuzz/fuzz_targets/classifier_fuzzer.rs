//! Fuzz target for InboundClassifier
//!
//! Feed arbitrary inbound frames, raw messages and evictions through a
//! classifier with small ledger capacities.
//!
//! # Invariants
//!
//! - Every live file record resolves to a blob of the recorded size
//! - One blob per live file record (evicted records release theirs)
//! - Record identifiers are unique across both ledgers
//! - Ledgers never exceed their capacity
//! - Malformed timestamps and content types NEVER panic

#![no_main]

use std::{collections::HashSet, num::NonZeroUsize};

use arbitrary::Arbitrary;
use bytes::Bytes;
use ferry_core::{ClassifierConfig, InboundClassifier, DEFAULT_TIME_FORMAT};
use ferry_proto::{FileFrame, TextFrame, TransferFrame};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum InboundOp {
    File { name: String, content_type: String, declared: Option<u64>, payload: Vec<u8> },
    Text { content: String, timestamp: String },
    Raw { bytes: Vec<u8> },
    Evict { index: u8 },
    Clear,
}

#[derive(Debug, Clone, Arbitrary)]
struct Input {
    max_files: u8,
    max_texts: u8,
    ops: Vec<InboundOp>,
}

fuzz_target!(|input: Input| {
    let config = ClassifierConfig {
        time_format: DEFAULT_TIME_FORMAT.to_string(),
        max_files: NonZeroUsize::new(usize::from(input.max_files % 5)),
        max_texts: NonZeroUsize::new(usize::from(input.max_texts % 5)),
    };
    let mut classifier = InboundClassifier::new(7, config.clone());

    for op in input.ops {
        match op {
            InboundOp::File { name, content_type, declared, payload } => {
                let size = declared.unwrap_or(payload.len() as u64);
                let frame = TransferFrame::File(FileFrame {
                    name,
                    size,
                    content_type,
                    payload: Bytes::from(payload),
                });
                assert!(classifier.on_frame(frame).is_some());
            }
            InboundOp::Text { content, timestamp } => {
                let frame = TransferFrame::Text(TextFrame { content, timestamp });
                assert!(classifier.on_frame(frame).is_some());
            }
            InboundOp::Raw { bytes } => {
                if let Ok(frame) = TransferFrame::decode(&bytes) {
                    classifier.on_frame(frame);
                }
            }
            InboundOp::Evict { index } => {
                let id = classifier.files().iter().nth(usize::from(index)).map(|f| f.id);
                if let Some(id) = id {
                    assert!(classifier.evict_file(id));
                    assert!(!classifier.evict_file(id));
                }
            }
            InboundOp::Clear => {
                classifier.clear();
                assert!(classifier.files().is_empty());
                assert!(classifier.texts().is_empty());
            }
        }

        assert_eq!(classifier.blobs().len(), classifier.files().len());
        for file in classifier.files().iter() {
            let blob = classifier.resolve(&file.reference).expect("live record not resolvable");
            assert_eq!(blob.bytes.len() as u64, file.size);
        }

        let mut ids = HashSet::new();
        for id in classifier.files().iter().map(|f| f.id).chain(classifier.texts().iter().map(|t| t.id)) {
            assert!(ids.insert(id), "duplicate record id {id}");
        }

        if let Some(max) = config.max_files {
            assert!(classifier.files().len() <= max.get());
        }
        if let Some(max) = config.max_texts {
            assert!(classifier.texts().len() <= max.get());
        }
    }
});
