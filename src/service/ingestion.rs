//! Ingestion pipeline: image submission → artifacts → recognition →
//! allow-list verdict → decision record.
//!
//! Every step is independently fallible and logged. Nothing is reported
//! back to the submitting connection; the returned [`IngestionOutcome`]
//! only feeds logs and tests.
//!
//! | Step | Failure effect                                         |
//! |------|--------------------------------------------------------|
//! | decode payload            | abort, nothing written            |
//! | write original artifact   | abort, nothing recorded           |
//! | write raw submission      | logged, continue                  |
//! | insert shell record       | logged, full record inserted at the end |
//! | recognition               | abort, shell stays as denied      |
//! | write result artifact     | logged, record has no result ref  |
//! | allow-list lookups        | logged per identifier, counts as miss |
//! | backfill record           | logged                            |

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use super::AllowListGate;
use crate::domain::{
    DecisionDraft, DecisionUpdate, IngestionId, IngestionRequest, Verdict,
};
use crate::error::GatewayError;
use crate::recognition::{RecognitionResult, Recognizer};
use crate::storage::{ArtifactRole, ArtifactStore};

/// Durable log of decision records.
#[async_trait]
pub trait DecisionStore: Send + Sync + fmt::Debug {
    /// Inserts a new record and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on store failure.
    async fn insert_decision(&self, draft: &DecisionDraft) -> Result<i64, GatewayError>;

    /// Backfills an existing record with its final outcome.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DecisionNotFound`] if `id` does not exist,
    /// or [`GatewayError::PersistenceError`] on store failure.
    async fn update_decision(&self, id: i64, update: &DecisionUpdate) -> Result<(), GatewayError>;
}

/// How far one ingestion got.
#[derive(Debug)]
pub enum IngestionOutcome {
    /// Aborted before anything was recorded (decode or original write).
    Rejected {
        /// Ingestion identifier.
        id: IngestionId,
        /// Cause of the abort.
        error: GatewayError,
    },
    /// Recognition failed; the shell record (if stored) stays denied.
    Incomplete {
        /// Ingestion identifier.
        id: IngestionId,
        /// Shell record, if it was stored.
        decision_id: Option<i64>,
        /// Cause of the abort.
        error: GatewayError,
    },
    /// Recognition and matching ran to the end.
    Completed {
        /// Ingestion identifier.
        id: IngestionId,
        /// Decision record, if it could be stored.
        decision_id: Option<i64>,
        /// Final authorization verdict.
        verdict: Verdict,
    },
}

impl IngestionOutcome {
    /// Returns the ingestion identifier.
    #[must_use]
    pub const fn id(&self) -> IngestionId {
        match self {
            Self::Rejected { id, .. } | Self::Incomplete { id, .. } | Self::Completed { id, .. } => {
                *id
            }
        }
    }

    /// Returns the decision record ID, if one was stored.
    #[must_use]
    pub const fn decision_id(&self) -> Option<i64> {
        match self {
            Self::Rejected { .. } => None,
            Self::Incomplete { decision_id, .. } | Self::Completed { decision_id, .. } => {
                *decision_id
            }
        }
    }
}

/// Orchestrates one ingestion over its four collaborators.
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    artifacts: Arc<dyn ArtifactStore>,
    recognizer: Arc<dyn Recognizer>,
    gate: AllowListGate,
    decisions: Arc<dyn DecisionStore>,
}

impl IngestionPipeline {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(
        artifacts: Arc<dyn ArtifactStore>,
        recognizer: Arc<dyn Recognizer>,
        gate: AllowListGate,
        decisions: Arc<dyn DecisionStore>,
    ) -> Self {
        Self {
            artifacts,
            recognizer,
            gate,
            decisions,
        }
    }

    /// Runs the full workflow for one submission.
    pub async fn ingest(&self, request: IngestionRequest) -> IngestionOutcome {
        let span = tracing::info_span!("ingestion", ingestion_id = %request.id);
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: IngestionRequest) -> IngestionOutcome {
        let id = request.id;

        let image = match request.decode() {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(stage = "decode", error = %err, "discarding submission");
                return IngestionOutcome::Rejected {
                    id,
                    error: err.into(),
                };
            }
        };

        let original = match self.artifacts.put(id, ArtifactRole::Original, &image).await {
            Ok(handle) => handle,
            Err(error) => {
                tracing::warn!(stage = "store_original", %error, "discarding submission");
                return IngestionOutcome::Rejected { id, error };
            }
        };

        if let Err(error) = self
            .artifacts
            .put(id, ArtifactRole::RawSubmission, request.raw.as_bytes())
            .await
        {
            tracing::warn!(stage = "store_raw", %error, "raw submission not kept");
        }

        let shell = DecisionDraft::shell(original.key.clone());
        let decision_id = match self.decisions.insert_decision(&shell).await {
            Ok(decision_id) => Some(decision_id),
            Err(error) => {
                tracing::warn!(stage = "record_shell", %error, "shell record not stored");
                None
            }
        };

        let result = match self.recognizer.recognize(&original).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(stage = "recognize", ?decision_id, error = %err, "recognition failed");
                return IngestionOutcome::Incomplete {
                    id,
                    decision_id,
                    error: err.into(),
                };
            }
        };

        let result_artifact = self.store_composite(id, &result).await;
        let verdict = self.gate.first_authorized(&result.identifiers).await;
        let update = DecisionUpdate::new(&result.identifiers, result_artifact, &verdict);
        let decision_id = self.record_outcome(decision_id, shell, update).await;

        tracing::info!(
            ?decision_id,
            plates = result.identifiers.len(),
            authorized = verdict.is_authorized(),
            "ingestion completed"
        );
        IngestionOutcome::Completed {
            id,
            decision_id,
            verdict,
        }
    }

    /// Decodes and writes the composite; `None` if either step fails.
    async fn store_composite(&self, id: IngestionId, result: &RecognitionResult) -> Option<String> {
        let composite = match result.decode_composite() {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(stage = "decode_result", error = %err, "composite discarded");
                return None;
            }
        };
        match self.artifacts.put(id, ArtifactRole::Result, &composite).await {
            Ok(handle) => Some(handle.key),
            Err(error) => {
                tracing::warn!(stage = "store_result", %error, "composite not kept");
                None
            }
        }
    }

    async fn record_outcome(
        &self,
        decision_id: Option<i64>,
        shell: DecisionDraft,
        update: DecisionUpdate,
    ) -> Option<i64> {
        match decision_id {
            Some(decision_id) => {
                if let Err(error) = self.decisions.update_decision(decision_id, &update).await {
                    tracing::warn!(stage = "record_outcome", decision_id, %error, "outcome not stored");
                }
                Some(decision_id)
            }
            None => match self.decisions.insert_decision(&shell.with_outcome(update)).await {
                Ok(decision_id) => Some(decision_id),
                Err(error) => {
                    tracing::warn!(stage = "record_outcome", %error, "decision lost");
                    None
                }
            },
        }
    }
}
