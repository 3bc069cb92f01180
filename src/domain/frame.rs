//! Transport-neutral message frames exchanged with connected clients.

use super::ConnectionId;

/// One application frame read from or written to a client.
///
/// Mirrors the two data frame kinds of the WebSocket protocol so the hub
/// can relay chat verbatim without depending on the socket type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
}

impl Frame {
    /// Returns the frame content as raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns `true` if the frame carries no payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// A chat frame queued for fan-out, tagged with its origin.
///
/// Exists only on the hub's dispatch queue between a connection's read
/// loop and the fan-out loop.
#[derive(Debug, Clone)]
pub struct BroadcastMessage {
    /// Connection that produced the frame; excluded from delivery.
    pub sender: ConnectionId,
    /// Frame relayed verbatim to every other connection.
    pub payload: Frame,
}
