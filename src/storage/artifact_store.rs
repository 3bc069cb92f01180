//! Artifact store: durable files addressed by ingestion ID and role.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::IngestionId;
use crate::error::GatewayError;

/// Role of an artifact within one ingestion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactRole {
    /// The decoded camera frame as submitted.
    Original,
    /// The annotated composite returned by recognition.
    Result,
    /// The raw inbound payload text, kept for auditing.
    RawSubmission,
}

impl ArtifactRole {
    /// Returns the file name of this role's artifact for `id`.
    #[must_use]
    pub fn file_name(self, id: IngestionId) -> String {
        match self {
            Self::Original => format!("original_{id}.jpg"),
            Self::Result => format!("result_{id}.jpg"),
            Self::RawSubmission => format!("base64_{id}.txt"),
        }
    }
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => f.write_str("original"),
            Self::Result => f.write_str("result"),
            Self::RawSubmission => f.write_str("raw-submission"),
        }
    }
}

/// Reference to a stored artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHandle {
    /// Key recorded in decision rows and served under `/images/{key}`.
    pub key: String,
    /// Location on disk.
    pub path: PathBuf,
}

/// Durable storage for ingestion artifacts.
///
/// `put` must only return once the artifact is fully written, so a handle
/// can be linked from a decision record immediately.
#[async_trait]
pub trait ArtifactStore: Send + Sync + fmt::Debug {
    /// Writes `bytes` as the `role` artifact of ingestion `id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ArtifactStorage`] if the write fails.
    async fn put(
        &self,
        id: IngestionId,
        role: ArtifactRole,
        bytes: &[u8],
    ) -> Result<ArtifactHandle, GatewayError>;
}

/// Filesystem-backed [`ArtifactStore`] rooted at one directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Opens the store, creating `root` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ArtifactStorage`] if the directory cannot
    /// be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, GatewayError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::debug!(root = %root.display(), "artifact store ready");
        Ok(Self { root })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn put(
        &self,
        id: IngestionId,
        role: ArtifactRole,
        bytes: &[u8],
    ) -> Result<ArtifactHandle, GatewayError> {
        let key = role.file_name(id);
        let path = self.root.join(&key);
        let partial = self.root.join(format!(".{key}.partial"));

        // Rename so a reader never sees a half-written artifact.
        let written = match tokio::fs::write(&partial, bytes).await {
            Ok(()) => tokio::fs::rename(&partial, &path).await,
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(%id, %role, error = %cleanup, "partial artifact left behind");
                }
            }
            return Err(err.into());
        }

        tracing::debug!(%id, %role, bytes = bytes.len(), "artifact written");
        Ok(ArtifactHandle { key, path })
    }
}
