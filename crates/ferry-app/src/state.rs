//! UI-facing state types.

use std::fmt;

use ferry_core::RecordId;

/// Link state as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No peer link.
    #[default]
    Disconnected,
    /// Waiting for the peer (listening or dialing).
    Connecting,
    /// Peer link up.
    Connected {
        /// Peer address.
        peer: String,
    },
}

impl ConnectionStatus {
    /// Frames can be handed to the channel.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected { peer } => write!(f, "connected to {peer}"),
        }
    }
}

/// What an export request was for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Received file exported as an image.
    Image {
        /// File record.
        record: RecordId,
        /// File name, for notifications.
        name: String,
    },
    /// Received text message.
    Text {
        /// Text record.
        record: RecordId,
    },
}
