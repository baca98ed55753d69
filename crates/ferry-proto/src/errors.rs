//! Error types for frame encoding and decoding.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding, decoding or validating a frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// CBOR serialization failed.
    #[error("CBOR encode error: {0}")]
    CborEncode(String),

    /// CBOR deserialization failed.
    #[error("CBOR decode error: {0}")]
    CborDecode(String),

    /// Encoded frame exceeds [`crate::MAX_FRAME_SIZE`].
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge {
        /// Actual encoded size in bytes.
        size: usize,
        /// Maximum accepted size in bytes.
        max: usize,
    },

    /// File frame declares a size that disagrees with its payload.
    #[error("size mismatch: declared {declared} bytes, payload has {actual}")]
    SizeMismatch {
        /// Size declared in the frame.
        declared: u64,
        /// Length of the attached payload.
        actual: u64,
    },

    /// Attempted to encode a frame of a kind this build does not understand.
    #[error("cannot encode frame of unknown kind")]
    UnknownKind,
}
