//! Registry of live connections with lock-protected fan-out.
//!
//! [`ConnectionRegistry`] maps each [`ConnectionId`] to the bounded
//! outbound queue drained by that connection's writer task. A single
//! [`tokio::sync::Mutex`] guards the map; it is held only to insert,
//! remove or iterate, never across socket I/O. Broadcast hands frames to
//! the queues with non-blocking `try_send`.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::{BroadcastMessage, ConnectionId, Frame};

/// Delivery counts for one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections the frame was queued for.
    pub delivered: usize,
    /// Connections removed because the send failed.
    pub evicted: usize,
}

/// Authoritative set of live connections.
///
/// # Concurrency
///
/// - Any number of read loops may register and unregister concurrently.
/// - Broadcast iterates under the same lock, so membership is stable for
///   the duration of one fan-out.
/// - A connection whose queue is closed or full is removed during the
///   broadcast that observed it and is never retried.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    clients: Mutex<HashMap<ConnectionId, mpsc::Sender<Frame>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection with its outbound queue.
    pub async fn register(&self, id: ConnectionId, outbound: mpsc::Sender<Frame>) {
        let mut clients = self.clients.lock().await;
        clients.insert(id, outbound);
        tracing::debug!(connection_id = %id, live = clients.len(), "connection registered");
    }

    /// Removes a connection, dropping its outbound queue.
    ///
    /// Returns `false` if the connection was already gone (for example,
    /// evicted by a failed broadcast).
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let mut clients = self.clients.lock().await;
        let removed = clients.remove(&id).is_some();
        tracing::debug!(connection_id = %id, removed, live = clients.len(), "connection unregistered");
        removed
    }

    /// Queues `message` for every connection except its sender.
    pub async fn broadcast(&self, message: &BroadcastMessage) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let mut clients = self.clients.lock().await;
        clients.retain(|id, outbound| {
            if *id == message.sender {
                return true;
            }
            match outbound.try_send(message.payload.clone()) {
                Ok(()) => {
                    report.delivered += 1;
                    true
                }
                Err(err) => {
                    let reason = match err {
                        TrySendError::Full(_) => "outbound queue full",
                        TrySendError::Closed(_) => "connection closed",
                    };
                    tracing::warn!(connection_id = %id, reason, "dropping connection from broadcast");
                    report.evicted += 1;
                    false
                }
            }
        });
        report
    }

    /// Returns `true` if the connection is registered.
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.clients.lock().await.contains_key(&id)
    }

    /// Returns the number of live connections.
    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Returns `true` if no connection is registered.
    pub async fn is_empty(&self) -> bool {
        self.clients.lock().await.is_empty()
    }
}
