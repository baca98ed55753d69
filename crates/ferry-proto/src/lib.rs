//! Ferry wire protocol
//!
//! Defines the [`TransferFrame`] exchanged between two peers and its CBOR
//! encoding. Framing of encoded frames on the wire (message boundaries) is the
//! responsibility of the channel that carries them.
//!
//! # Components
//!
//! - [`TransferFrame`]: discriminated union of [`FileFrame`] and [`TextFrame`]
//! - [`ProtocolError`]: encode/decode/validation failures

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
mod frame;

pub use errors::{ProtocolError, Result};
pub use frame::{
    DEFAULT_CONTENT_TYPE, FileFrame, FrameKind, MAX_FRAME_SIZE, TextFrame, TransferFrame,
};
