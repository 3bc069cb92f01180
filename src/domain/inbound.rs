//! Classification of inbound frames into chat traffic or image submissions.
//!
//! A frame is an image submission when its content starts with the
//! configured marker (default [`DEFAULT_IMAGE_MARKER`]). Everything after
//! the marker, trimmed, is the standard-alphabet base64 image. A data-URL
//! header (`data:image/jpeg;base64,`) in front of the body is tolerated.
//! Any other frame is chat and is relayed verbatim.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{Frame, IngestionId};

/// Marker prefix used when none is configured.
pub const DEFAULT_IMAGE_MARKER: &str = "base64:";

const DATA_URL_SEPARATOR: &str = ";base64,";

/// Result of classifying one inbound frame.
#[derive(Debug, Clone)]
pub enum InboundPayload {
    /// Plain traffic to relay to every other connection.
    Chat(Frame),
    /// Image submission to run through the ingestion pipeline.
    ImageSubmission(IngestionRequest),
}

/// One image submission, consumed once by the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct IngestionRequest {
    /// Identifier namespacing every artifact of this event.
    pub id: IngestionId,
    /// The full inbound payload, kept for the raw-submission audit artifact.
    pub raw: String,
    encoded: String,
}

impl IngestionRequest {
    /// Builds a request from the full payload text and its marker.
    ///
    /// Returns `None` if `raw` does not start with `marker`.
    #[must_use]
    pub fn from_payload(raw: String, marker: &str) -> Option<Self> {
        let body = raw.strip_prefix(marker)?;
        let encoded = strip_data_url(body.trim()).to_string();
        Some(Self {
            id: IngestionId::new(),
            raw,
            encoded,
        })
    }

    /// Returns the base64 body with marker and data-URL header removed.
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Decodes the embedded image.
    ///
    /// # Errors
    ///
    /// Returns [`base64::DecodeError`] if the body is not valid standard
    /// base64.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.encoded.as_bytes())
    }
}

/// Classifies a frame against the image-submission marker.
#[must_use]
pub fn classify(frame: Frame, marker: &str) -> InboundPayload {
    if marker.is_empty() || !frame.as_bytes().starts_with(marker.as_bytes()) {
        return InboundPayload::Chat(frame);
    }
    let raw = match &frame {
        Frame::Text(text) => text.clone(),
        Frame::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    };
    match IngestionRequest::from_payload(raw, marker) {
        Some(request) => InboundPayload::ImageSubmission(request),
        None => InboundPayload::Chat(frame),
    }
}

fn strip_data_url(body: &str) -> &str {
    if body.starts_with("data:")
        && let Some(pos) = body.find(DATA_URL_SEPARATOR)
    {
        return body
            .get(pos + DATA_URL_SEPARATOR.len()..)
            .unwrap_or_default();
    }
    body
}
