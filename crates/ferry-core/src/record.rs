//! Records of received items.

use chrono::{DateTime, Utc};

use crate::{blob::BlobRef, ids::RecordId};

/// Entry that can be stored in a [`Ledger`](crate::Ledger).
pub trait Record {
    /// Identifier unique within the owning ledger.
    fn id(&self) -> RecordId;
}

/// File received from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFileRecord {
    /// Ledger identifier.
    pub id: RecordId,
    /// Name declared by the sender.
    pub name: String,
    /// Payload length in bytes.
    pub size: u64,
    /// Published reference to the payload, resolvable while the record lives.
    pub reference: BlobRef,
    /// MIME type declared by the sender.
    pub content_type: String,
}

impl ReceivedFileRecord {
    /// Declared content type is an image.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

impl Record for ReceivedFileRecord {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Text message received from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedTextRecord {
    /// Ledger identifier.
    pub id: RecordId,
    /// Message, verbatim.
    pub content: String,
    /// Display form of the sender's origination time.
    pub timestamp: String,
    /// Origination time. `None` if the sender's timestamp was unparseable.
    pub sent_at: Option<DateTime<Utc>>,
}

impl Record for ReceivedTextRecord {
    fn id(&self) -> RecordId {
        self.id
    }
}
