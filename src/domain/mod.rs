//! Domain layer: identities, frames, records and the connection registry.
//!
//! This module holds the relay's core types: connection and ingestion
//! identity, the frames relayed between clients, classification of inbound
//! payloads, allow-list and decision records, and the registry of live
//! connections used for fan-out.

pub mod allow_list;
pub mod connection_id;
pub mod connection_registry;
pub mod decision;
pub mod frame;
pub mod inbound;
pub mod ingestion_id;

pub use allow_list::{AllowListEntry, LookupOutcome, MatchMode};
pub use connection_id::ConnectionId;
pub use connection_registry::{BroadcastReport, ConnectionRegistry};
pub use decision::{DecisionDraft, DecisionRecord, DecisionUpdate, Verdict};
pub use frame::{BroadcastMessage, Frame};
pub use inbound::{DEFAULT_IMAGE_MARKER, InboundPayload, IngestionRequest, classify};
pub use ingestion_id::IngestionId;
