//! HTTP client for the external plate recognition service.
//!
//! Uploads one artifact as a multipart `file` field and parses the JSON
//! reply `{"mosaic_base64": "...", "plate_texts": ["..."]}`. One attempt
//! per call, no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::{RecognitionError, RecognitionResult, Recognizer};
use crate::storage::ArtifactHandle;

const USER_AGENT: &str = concat!("plate-gateway/", env!("CARGO_PKG_VERSION"));
const UPLOAD_FIELD: &str = "file";
const UPLOAD_MIME: &str = "image/jpeg";

/// [`Recognizer`] backed by a single HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpRecognitionClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpRecognitionClient {
    /// Creates a client posting to `endpoint`.
    ///
    /// `timeout` bounds the whole round trip; `None` waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns [`RecognitionError::Transport`] if the HTTP client cannot
    /// be built.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, RecognitionError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    /// Returns the configured endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Recognizer for HttpRecognitionClient {
    async fn recognize(
        &self,
        artifact: &ArtifactHandle,
    ) -> Result<RecognitionResult, RecognitionError> {
        let bytes = tokio::fs::read(&artifact.path).await.map_err(|e| {
            RecognitionError::Transport(format!("reading {}: {e}", artifact.key))
        })?;

        let part = Part::bytes(bytes)
            .file_name(artifact.key.clone())
            .mime_str(UPLOAD_MIME)
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        tracing::debug!(endpoint = %self.endpoint, artifact = %artifact.key, "submitting to recognition service");

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecognitionError::Transport(format!(
                "recognition service returned {status}: {error_text}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        let result: RecognitionResult = serde_json::from_slice(&body)
            .map_err(|e| RecognitionError::MalformedResponse(e.to_string()))?;

        tracing::info!(
            artifact = %artifact.key,
            plates = result.identifiers.len(),
            "recognition succeeded"
        );
        Ok(result)
    }
}
