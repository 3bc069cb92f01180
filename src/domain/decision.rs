//! Decision records: the durable outcome of one ingestion event.
//!
//! A record starts life as a denied *shell* referencing only the original
//! artifact, and is backfilled with the recognized identifiers, the result
//! artifact and the final verdict once the pipeline completes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Separator used when joining recognized identifiers into one column.
pub const IDENTIFIER_SEPARATOR: &str = ", ";

/// A stored row from the `decision_records` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DecisionRecord {
    /// Auto-increment row ID.
    pub id: i64,
    /// Time the submission was first recorded.
    pub created_at: DateTime<Utc>,
    /// Recognized identifiers joined with [`IDENTIFIER_SEPARATOR`].
    pub identifiers: String,
    /// File name of the decoded submission.
    pub original_artifact: Option<String>,
    /// File name of the annotated composite returned by recognition.
    pub result_artifact: Option<String>,
    /// Whether any recognized identifier was authorized.
    pub authorized: bool,
}

/// Values for a new decision row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionDraft {
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// File name of the decoded submission.
    pub original_artifact: String,
    /// Joined identifiers; empty for a shell.
    pub identifiers: String,
    /// File name of the composite artifact, if written.
    pub result_artifact: Option<String>,
    /// Authorization outcome; `false` until proven otherwise.
    pub authorized: bool,
}

impl DecisionDraft {
    /// Creates a denied shell referencing only the original artifact.
    #[must_use]
    pub fn shell(original_artifact: impl Into<String>) -> Self {
        Self {
            created_at: Utc::now(),
            original_artifact: original_artifact.into(),
            identifiers: String::new(),
            result_artifact: None,
            authorized: false,
        }
    }

    /// Returns this draft with the backfilled outcome applied.
    #[must_use]
    pub fn with_outcome(mut self, update: DecisionUpdate) -> Self {
        self.identifiers = update.identifiers;
        self.result_artifact = update.result_artifact;
        self.authorized = update.authorized;
        self
    }
}

/// Backfill applied to a shell once recognition and matching finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionUpdate {
    /// Recognized identifiers joined with [`IDENTIFIER_SEPARATOR`].
    pub identifiers: String,
    /// File name of the composite artifact, if it was written.
    pub result_artifact: Option<String>,
    /// Final authorization outcome.
    pub authorized: bool,
}

impl DecisionUpdate {
    /// Builds the update from the recognition output and the gate verdict.
    #[must_use]
    pub fn new(identifiers: &[String], result_artifact: Option<String>, verdict: &Verdict) -> Self {
        Self {
            identifiers: identifiers.join(IDENTIFIER_SEPARATOR),
            result_artifact,
            authorized: verdict.is_authorized(),
        }
    }
}

/// Authorization verdict for one ingestion event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// An identifier matched an active allow-list entry.
    Authorized {
        /// The first matching identifier, in recognition order.
        identifier: String,
    },
    /// No identifier matched an active entry.
    Denied,
}

impl Verdict {
    /// Returns `true` for [`Verdict::Authorized`].
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized { .. })
    }
}
