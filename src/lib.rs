//! # plate-gateway
//!
//! WebSocket relay with a plate-recognition ingestion pipeline.
//!
//! Connected clients exchange chat frames through a single fan-out loop.
//! Frames that start with the image marker (`base64:` by default) are not
//! relayed: they are decoded, stored, sent to an external recognition
//! service, checked against an allow-list and recorded as a decision.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, admin HTTP)
//!     │
//!     ├── WS Handler (ws/)          ── REST Handlers (api/)
//!     │
//!     ├── ConnectionHub + FanOut (service/hub)
//!     │       └── ConnectionRegistry (domain/)
//!     │
//!     ├── IngestionPipeline (service/ingestion)
//!     │       ├── ArtifactStore (storage/)
//!     │       ├── Recognizer (recognition/)  ──► external recognition service
//!     │       ├── AllowListGate (service/allow_list_gate)
//!     │       └── DecisionStore
//!     │
//!     └── SQLite Persistence (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod recognition;
pub mod server;
pub mod service;
pub mod storage;
pub mod ws;
