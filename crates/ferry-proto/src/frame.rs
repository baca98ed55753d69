//! Transfer frames.
//!
//! A [`TransferFrame`] is the only entity that crosses the peer boundary. It is
//! a discriminated union tagged by `kind`:
//!
//! ```text
//! File: { kind: "file", name, size, contentType, payload: bytes }
//! Text: { kind: "text", content, timestamp: ISO-8601 }
//! ```
//!
//! Frames are CBOR maps. No length prefix or checksum is added here; message
//! boundaries belong to whatever channel carries the encoded bytes.
//!
//! # Invariants
//!
//! - Size Consistency: a `File` frame's `size` MUST equal its payload length.
//!   Enforced by [`TransferFrame::file`] and verified by
//!   [`TransferFrame::decode`].
//!
//! - Size Limit: an encoded frame MUST NOT exceed [`MAX_FRAME_SIZE`].
//!
//! - Forward Compatibility: a frame whose `kind` is not recognised decodes to
//!   [`TransferFrame::Unknown`] instead of failing, so newer peers can add
//!   kinds without breaking older ones.

use std::fmt;

use bytes::{BufMut, Bytes};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ProtocolError, Result};

/// Content type used when the sender does not know one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Maximum size of an encoded frame (64 MiB).
///
/// Files are carried whole in a single frame, so this also bounds the largest
/// transferable file.
pub const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Frame discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Binary file with metadata.
    File,
    /// Short text snippet.
    Text,
    /// Kind not understood by this build.
    Unknown,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Text => f.write_str("text"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Payload unit exchanged over the data channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransferFrame {
    /// A whole file.
    File(FileFrame),
    /// A text snippet.
    Text(TextFrame),
    /// A frame of a kind this build does not understand.
    ///
    /// Only ever produced by decoding. Encoding it fails with
    /// [`ProtocolError::UnknownKind`].
    #[serde(other)]
    Unknown,
}

/// File variant of [`TransferFrame`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFrame {
    /// File name as chosen by the sender.
    pub name: String,
    /// Declared byte length. Equal to `payload.len()` in a valid frame.
    pub size: u64,
    /// Declared content type (MIME).
    pub content_type: String,
    /// Raw file bytes.
    pub payload: Bytes,
}

impl fmt::Debug for FileFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileFrame")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// Text variant of [`TransferFrame`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFrame {
    /// Text content, verbatim.
    pub content: String,
    /// Origination time as an ISO-8601 / RFC 3339 string.
    pub timestamp: String,
}

impl TextFrame {
    /// Create a text frame stamped with the given origination time.
    pub fn new(content: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            timestamp: sent_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Parsed origination time. `None` if the sender's timestamp is malformed.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp).ok().map(|t| t.with_timezone(&Utc))
    }
}

impl TransferFrame {
    /// Build a file frame. `size` is taken from the payload, and a missing or
    /// empty content type falls back to [`DEFAULT_CONTENT_TYPE`].
    pub fn file(name: impl Into<String>, content_type: Option<&str>, payload: Bytes) -> Self {
        let content_type = match content_type {
            Some(ct) if !ct.trim().is_empty() => ct.to_string(),
            _ => DEFAULT_CONTENT_TYPE.to_string(),
        };

        Self::File(FileFrame {
            name: name.into(),
            size: payload.len() as u64,
            content_type,
            payload,
        })
    }

    /// Build a text frame stamped with `sent_at`.
    pub fn text(content: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self::Text(TextFrame::new(content, sent_at))
    }

    /// Discriminant of this frame.
    #[must_use]
    pub const fn kind(&self) -> FrameKind {
        match self {
            Self::File(_) => FrameKind::File,
            Self::Text(_) => FrameKind::Text,
            Self::Unknown => FrameKind::Unknown,
        }
    }

    /// Check structural validity.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::SizeMismatch` if a file frame's declared size differs
    ///   from its payload length
    pub fn validate(&self) -> Result<()> {
        if let Self::File(file) = self {
            let actual = file.payload.len() as u64;
            if file.size != actual {
                return Err(ProtocolError::SizeMismatch { declared: file.size, actual });
            }
        }
        Ok(())
    }

    /// Encode the frame as CBOR into `dst`.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::UnknownKind` for [`TransferFrame::Unknown`]
    /// - `ProtocolError::SizeMismatch` if the frame fails validation
    /// - `ProtocolError::CborEncode` if serialization fails
    /// - `ProtocolError::FrameTooLarge` if the encoding exceeds
    ///   [`MAX_FRAME_SIZE`]
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        if matches!(self, Self::Unknown) {
            return Err(ProtocolError::UnknownKind);
        }
        self.validate()?;

        let mut buf = Vec::with_capacity(self.payload_len() + 128);
        ciborium::ser::into_writer(self, &mut buf)
            .map_err(|e| ProtocolError::CborEncode(e.to_string()))?;

        if buf.len() > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge { size: buf.len(), max: MAX_FRAME_SIZE });
        }

        dst.put_slice(&buf);
        Ok(())
    }

    /// Encode the frame into a fresh buffer.
    ///
    /// # Errors
    ///
    /// See [`TransferFrame::encode`].
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = Vec::new();
        self.encode(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Decode a frame from one complete channel message.
    ///
    /// The size check happens before CBOR parsing so an oversized message is
    /// never handed to the parser.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::FrameTooLarge` if `bytes` exceed [`MAX_FRAME_SIZE`]
    /// - `ProtocolError::CborDecode` if the bytes are not a valid frame map
    /// - `ProtocolError::SizeMismatch` if a file frame fails validation
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge { size: bytes.len(), max: MAX_FRAME_SIZE });
        }

        let frame: Self = ciborium::de::from_reader(bytes)
            .map_err(|e| ProtocolError::CborDecode(e.to_string()))?;
        frame.validate()?;

        Ok(frame)
    }

    fn payload_len(&self) -> usize {
        match self {
            Self::File(file) => file.payload.len(),
            Self::Text(text) => text.content.len(),
            Self::Unknown => 0,
        }
    }
}
