//! Identifier namespacing every artifact written by one ingestion event.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier generated per image submission.
///
/// Wraps a UUID v4. All artifacts of the event (`original_<id>.jpg`,
/// `result_<id>.jpg`, `base64_<id>.txt`) share it, so two concurrent
/// ingestions can never write to the same file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngestionId(uuid::Uuid);

impl IngestionId {
    /// Creates a new random `IngestionId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates an `IngestionId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for IngestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IngestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
