//! Storage of binary artifacts produced by ingestion events.

pub mod artifact_store;

pub use artifact_store::{ArtifactHandle, ArtifactRole, ArtifactStore, FsArtifactStore};
