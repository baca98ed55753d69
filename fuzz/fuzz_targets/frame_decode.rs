//! Fuzz target for TransferFrame::decode
//!
//! This fuzzer tests frame decoding with arbitrary byte sequences to find:
//! - Parser crashes or panics
//! - Frames that decode but fail to re-encode
//! - File frames whose declared size slips past validation
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use ferry_proto::{TransferFrame, MAX_FRAME_SIZE};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(frame) = TransferFrame::decode(data) else {
        return;
    };

    if let TransferFrame::File(file) = &frame {
        assert_eq!(file.size, file.payload.len() as u64, "decoded frame with size mismatch");
    }

    if matches!(frame, TransferFrame::Unknown) {
        return;
    }

    // Anything that decodes must encode again and decode to the same frame.
    let bytes = frame.to_bytes().expect("decoded frame failed to encode");
    assert!(bytes.len() <= MAX_FRAME_SIZE);
    let again = TransferFrame::decode(&bytes).expect("re-encoded frame failed to decode");
    assert_eq!(frame, again);
});
