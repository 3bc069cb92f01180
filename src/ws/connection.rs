//! Per-connection read and write loops.
//!
//! The read loop hands every data frame to the hub. The write loop drains
//! the connection's outbound queue into the socket. Whichever ends first
//! ends the connection, after any frame already read has been dispatched,
//! and the connection is unregistered on that path.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::{ConnectionId, Frame};
use crate::service::{ConnectionHub, Dispatch};

/// Runs one WebSocket connection until it closes or fails.
///
/// Only waiting for the next frame races the writer. Once a frame is read,
/// its dispatch runs to completion even if the writer stops meanwhile.
pub async fn run_connection(socket: WebSocket, hub: Arc<ConnectionHub>) {
    let connection_id = ConnectionId::new();
    let (ws_tx, ws_rx) = socket.split();

    let outbound = hub.register(connection_id).await;
    let mut writer = tokio::spawn(write_loop(connection_id, ws_tx, outbound));

    read_loop(connection_id, ws_rx, &hub, &mut writer).await;

    hub.unregister(connection_id).await;
    writer.abort();
}

async fn read_loop(
    connection_id: ConnectionId,
    mut ws_rx: SplitStream<WebSocket>,
    hub: &ConnectionHub,
    writer: &mut JoinHandle<()>,
) {
    loop {
        let message = tokio::select! {
            message = ws_rx.next() => message,
            _ = &mut *writer => {
                tracing::debug!(%connection_id, "writer stopped");
                return;
            }
        };

        let frame = match message {
            Some(Ok(Message::Text(text))) => Frame::Text(text.as_str().to_owned()),
            Some(Ok(Message::Binary(bytes))) => Frame::Binary(bytes.to_vec()),
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(Message::Close(_))) | None => {
                tracing::debug!(%connection_id, "client closed connection");
                return;
            }
            Some(Err(err)) => {
                tracing::debug!(%connection_id, error = %err, "read failed");
                return;
            }
        };

        if let Dispatch::QueueClosed = hub.on_message(connection_id, frame).await {
            return;
        }
    }
}

async fn write_loop(
    connection_id: ConnectionId,
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<Frame>,
) {
    while let Some(frame) = outbound.recv().await {
        let message = match frame {
            Frame::Text(text) => Message::text(text),
            Frame::Binary(bytes) => Message::binary(bytes),
        };
        if let Err(err) = ws_tx.send(message).await {
            tracing::debug!(%connection_id, error = %err, "write failed");
            return;
        }
    }
    let _ = ws_tx.close().await;
}
