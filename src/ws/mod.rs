//! WebSocket layer: upgrade handling and per-connection loops.
//!
//! Clients connect at `/ws` (and `/` for clients built against the bare
//! root path). Text and binary frames are relayed to every other client;
//! frames starting with the image marker are ingested instead.

pub mod connection;
pub mod handler;
