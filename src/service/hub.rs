//! Connection hub: routes inbound frames and drives fan-out.
//!
//! Each connection's read loop calls [`ConnectionHub::on_message`]. Chat
//! frames go onto a bounded dispatch queue drained by exactly one
//! [`FanOut`] loop, so broadcasts are delivered in enqueue order. Image
//! submissions run the [`IngestionPipeline`] inline in the caller's task
//! and are never relayed.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{IngestionOutcome, IngestionPipeline};
use crate::domain::{
    BroadcastMessage, BroadcastReport, ConnectionId, ConnectionRegistry, DEFAULT_IMAGE_MARKER,
    Frame, InboundPayload, classify,
};

/// Sizing and classification settings for the hub.
#[derive(Debug, Clone)]
pub struct HubSettings {
    /// Capacity of the dispatch queue feeding the fan-out loop.
    pub queue_capacity: usize,
    /// Capacity of each connection's outbound queue.
    pub outbound_capacity: usize,
    /// Prefix marking an image submission.
    pub image_marker: String,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            outbound_capacity: 256,
            image_marker: DEFAULT_IMAGE_MARKER.to_string(),
        }
    }
}

/// What the hub did with one inbound frame.
#[derive(Debug)]
pub enum Dispatch {
    /// Queued for fan-out to every other connection.
    Relayed,
    /// Ran through the ingestion pipeline.
    Ingested(IngestionOutcome),
    /// The fan-out loop has stopped; the frame was dropped.
    QueueClosed,
}

/// Owner of the live connection set and the broadcast queue.
#[derive(Debug)]
pub struct ConnectionHub {
    registry: Arc<ConnectionRegistry>,
    queue: mpsc::Sender<BroadcastMessage>,
    pipeline: IngestionPipeline,
    settings: HubSettings,
}

/// The single consumer of the hub's dispatch queue.
///
/// Holding the only receiver guarantees one fan-out loop per hub.
#[derive(Debug)]
pub struct FanOut {
    registry: Arc<ConnectionRegistry>,
    queue: mpsc::Receiver<BroadcastMessage>,
}

impl ConnectionHub {
    /// Creates a hub and the fan-out loop that must be spawned for it.
    #[must_use]
    pub fn new(pipeline: IngestionPipeline, settings: HubSettings) -> (Self, FanOut) {
        let registry = Arc::new(ConnectionRegistry::new());
        let (queue, receiver) = mpsc::channel(settings.queue_capacity.max(1));
        let hub = Self {
            registry: Arc::clone(&registry),
            queue,
            pipeline,
            settings,
        };
        let fan_out = FanOut {
            registry,
            queue: receiver,
        };
        (hub, fan_out)
    }

    /// Returns the live connection registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Registers a connection and returns the queue its writer drains.
    pub async fn register(&self, id: ConnectionId) -> mpsc::Receiver<Frame> {
        let (outbound, receiver) = mpsc::channel(self.settings.outbound_capacity.max(1));
        self.registry.register(id, outbound).await;
        tracing::info!(connection_id = %id, "client connected");
        receiver
    }

    /// Removes a connection. Called once when its read loop exits.
    pub async fn unregister(&self, id: ConnectionId) {
        let was_live = self.registry.unregister(id).await;
        tracing::info!(connection_id = %id, was_live, "client disconnected");
    }

    /// Classifies one inbound frame and routes it.
    pub async fn on_message(&self, sender: ConnectionId, frame: Frame) -> Dispatch {
        match classify(frame, &self.settings.image_marker) {
            InboundPayload::ImageSubmission(request) => {
                tracing::info!(
                    connection_id = %sender,
                    ingestion_id = %request.id,
                    bytes = request.raw.len(),
                    "image submission received"
                );
                Dispatch::Ingested(self.pipeline.ingest(request).await)
            }
            InboundPayload::Chat(payload) => {
                tracing::debug!(connection_id = %sender, bytes = payload.len(), "relaying message");
                let message = BroadcastMessage { sender, payload };
                match self.queue.send(message).await {
                    Ok(()) => Dispatch::Relayed,
                    Err(_) => {
                        tracing::warn!(connection_id = %sender, "broadcast queue closed");
                        Dispatch::QueueClosed
                    }
                }
            }
        }
    }
}

impl FanOut {
    /// Drains the dispatch queue until every hub sender is dropped.
    pub async fn run(mut self) {
        tracing::debug!("fan-out loop started");
        while let Some(message) = self.queue.recv().await {
            let BroadcastReport { delivered, evicted } = self.registry.broadcast(&message).await;
            tracing::trace!(sender = %message.sender, delivered, evicted, "broadcast dispatched");
        }
        tracing::debug!("fan-out loop stopped");
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::Verdict;
    use crate::service::testing::Fixture;

    async fn recv(rx: &mut mpsc::Receiver<Frame>) -> Option<Frame> {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .ok()
            .flatten()
    }

    fn start(fixture: &Fixture) -> Arc<ConnectionHub> {
        let (hub, fan_out) = ConnectionHub::new(fixture.pipeline(), HubSettings::default());
        tokio::spawn(fan_out.run());
        Arc::new(hub)
    }

    #[tokio::test]
    async fn chat_reaches_others_but_not_sender() {
        let fixture = Fixture::recognizing(&[], &[]);
        let hub = start(&fixture);
        let (a, b, c) = (ConnectionId::new(), ConnectionId::new(), ConnectionId::new());
        let mut rx_a = hub.register(a).await;
        let mut rx_b = hub.register(b).await;
        let mut rx_c = hub.register(c).await;

        let dispatch = hub.on_message(a, Frame::Text("hello".to_string())).await;
        assert!(matches!(dispatch, Dispatch::Relayed));

        assert_eq!(recv(&mut rx_b).await, Some(Frame::Text("hello".to_string())));
        assert_eq!(recv(&mut rx_c).await, Some(Frame::Text("hello".to_string())));
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcasts_keep_enqueue_order() {
        let fixture = Fixture::recognizing(&[], &[]);
        let hub = start(&fixture);
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        let _rx_a = hub.register(a).await;
        let mut rx_b = hub.register(b).await;

        for n in 0..20 {
            let _ = hub.on_message(a, Frame::Text(format!("m{n}"))).await;
        }
        for n in 0..20 {
            assert_eq!(recv(&mut rx_b).await, Some(Frame::Text(format!("m{n}"))));
        }
    }

    #[tokio::test]
    async fn binary_chat_is_relayed_verbatim() {
        let fixture = Fixture::recognizing(&[], &[]);
        let hub = start(&fixture);
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        let _rx_a = hub.register(a).await;
        let mut rx_b = hub.register(b).await;

        let _ = hub.on_message(a, Frame::Binary(vec![0, 1, 2])).await;
        assert_eq!(recv(&mut rx_b).await, Some(Frame::Binary(vec![0, 1, 2])));
    }

    #[tokio::test]
    async fn image_submission_is_ingested_not_relayed() {
        let fixture = Fixture::recognizing(&["ABC123"], &[("ABC123", true)]);
        let hub = start(&fixture);
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        let _rx_a = hub.register(a).await;
        let mut rx_b = hub.register(b).await;

        let dispatch = hub
            .on_message(a, Frame::Text("base64:aGVsbG8=".to_string()))
            .await;
        let Dispatch::Ingested(IngestionOutcome::Completed { verdict, .. }) = dispatch else {
            panic!("expected completed ingestion, got {dispatch:?}");
        };
        assert!(matches!(verdict, Verdict::Authorized { .. }));
        assert_eq!(fixture.decisions.records().len(), 1);

        let _ = hub.on_message(a, Frame::Text("after".to_string())).await;
        assert_eq!(recv(&mut rx_b).await, Some(Frame::Text("after".to_string())));
    }

    #[tokio::test]
    async fn decode_failure_keeps_serving_the_connection() {
        let fixture = Fixture::recognizing(&["ABC123"], &[]);
        let hub = start(&fixture);
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        let _rx_a = hub.register(a).await;
        let mut rx_b = hub.register(b).await;

        let dispatch = hub.on_message(a, Frame::Text("base64:@@@".to_string())).await;
        assert!(matches!(
            dispatch,
            Dispatch::Ingested(IngestionOutcome::Rejected { .. })
        ));
        assert!(fixture.decisions.records().is_empty());
        assert!(hub.registry().contains(a).await);

        let _ = hub.on_message(a, Frame::Text("still here".to_string())).await;
        assert_eq!(recv(&mut rx_b).await, Some(Frame::Text("still here".to_string())));
    }

    #[tokio::test]
    async fn unregistered_connection_receives_nothing() {
        let fixture = Fixture::recognizing(&[], &[]);
        let hub = start(&fixture);
        let (a, b, c) = (ConnectionId::new(), ConnectionId::new(), ConnectionId::new());
        let _rx_a = hub.register(a).await;
        let mut rx_b = hub.register(b).await;
        let mut rx_c = hub.register(c).await;

        hub.unregister(b).await;
        let _ = hub.on_message(a, Frame::Text("bye b".to_string())).await;

        assert_eq!(recv(&mut rx_c).await, Some(Frame::Text("bye b".to_string())));
        assert_eq!(rx_b.recv().await, None);
    }

    #[tokio::test]
    async fn stopped_fan_out_reports_closed_queue() {
        let fixture = Fixture::recognizing(&[], &[]);
        let (hub, fan_out) = ConnectionHub::new(fixture.pipeline(), HubSettings::default());
        drop(fan_out);

        let dispatch = hub
            .on_message(ConnectionId::new(), Frame::Text("lost".to_string()))
            .await;
        assert!(matches!(dispatch, Dispatch::QueueClosed));
    }
}
