//! Recognition adapter: submits an artifact to the external service.
//!
//! The pipeline depends only on the [`Recognizer`] trait;
//! [`HttpRecognitionClient`] is the production implementation.

pub mod client;

use std::fmt;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize};

use crate::storage::ArtifactHandle;

pub use client::HttpRecognitionClient;

/// Failure of a single recognition attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionError {
    /// The request could not be sent or the service replied with an error.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service replied, but the body is not a valid result.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Response of the recognition service for one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Base64 composite image annotated with the detections.
    #[serde(rename = "mosaic_base64")]
    pub composite_image: String,

    /// Recognized plate texts, in the order the service returned them.
    #[serde(rename = "plate_texts", default, deserialize_with = "null_as_empty")]
    pub identifiers: Vec<String>,
}

impl RecognitionResult {
    /// Decodes the composite image.
    ///
    /// # Errors
    ///
    /// Returns [`base64::DecodeError`] if the field is not valid base64.
    pub fn decode_composite(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.composite_image.trim().as_bytes())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Synchronous submit/respond contract with the recognition service.
#[async_trait]
pub trait Recognizer: Send + Sync + fmt::Debug {
    /// Submits the artifact and waits for the result.
    ///
    /// # Errors
    ///
    /// Returns [`RecognitionError`] on transport failure or malformed reply.
    async fn recognize(
        &self,
        artifact: &ArtifactHandle,
    ) -> Result<RecognitionResult, RecognitionError>;
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_reply() {
        let json = r#"{"mosaic_base64":"aGVsbG8=","plate_texts":["ABC123","XYZ999"]}"#;
        let Ok(result) = serde_json::from_str::<RecognitionResult>(json) else {
            panic!("parse failed");
        };
        assert_eq!(result.identifiers, vec!["ABC123", "XYZ999"]);
        assert_eq!(result.decode_composite().ok(), Some(b"hello".to_vec()));
    }

    #[test]
    fn null_or_missing_plates_are_empty() {
        let Ok(null) = serde_json::from_str::<RecognitionResult>(
            r#"{"mosaic_base64":"","plate_texts":null}"#,
        ) else {
            panic!("parse failed");
        };
        assert!(null.identifiers.is_empty());

        let Ok(missing) = serde_json::from_str::<RecognitionResult>(r#"{"mosaic_base64":""}"#)
        else {
            panic!("parse failed");
        };
        assert!(missing.identifiers.is_empty());
    }

    #[test]
    fn missing_composite_is_rejected() {
        let result = serde_json::from_str::<RecognitionResult>(r#"{"plate_texts":[]}"#);
        assert!(result.is_err());
    }
}
