//! Service layer: orchestration over the domain and its collaborators.
//!
//! [`ConnectionHub`] routes inbound frames, [`IngestionPipeline`] drives the
//! recognition workflow, and [`AllowListGate`] reduces recognized
//! identifiers to one verdict.

pub mod allow_list_gate;
pub mod hub;
pub mod ingestion;

#[cfg(test)]
pub(crate) mod testing;

pub use allow_list_gate::{AllowListGate, AllowListLookup};
pub use hub::{ConnectionHub, Dispatch, FanOut, HubSettings};
pub use ingestion::{DecisionStore, IngestionOutcome, IngestionPipeline};
