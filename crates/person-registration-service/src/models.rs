//! Data models for the Person Registration Service

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata key identifying the device that uploaded an image
pub const DEVICE_ID_METADATA_KEY: &str = "deviceid";

/// Blob-created event delivered by the image storage webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCreatedEvent {
    /// Blob name without extension; doubles as the requestId
    pub name: String,

    /// Blob extension
    pub extension: String,

    /// Publicly reachable URL of the blob
    pub url: String,

    /// Declared content type of the blob
    pub content_type: String,

    /// Blob metadata set by the uploader
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ImageCreatedEvent {
    /// Full blob name as stored in the container
    pub fn blob_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }

    /// Identifier of the device that uploaded the image, if present
    pub fn device_id(&self) -> Option<&str> {
        self.metadata.get(DEVICE_ID_METADATA_KEY).map(String::as_str)
    }
}

/// Opaque face descriptor returned by the detection backend
///
/// Only the number of descriptors matters to the workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceDescriptor(pub serde_json::Value);

/// Terminal outcome of one image registration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    IncorrectFormat,
    NoFaces,
    MultipleFaces,
    Error,
    Success,
}

impl Outcome {
    /// Notification text displayed on the mobile device
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::IncorrectFormat => "Incorrect Image Format",
            Outcome::NoFaces => "The are not faces in the photo",
            Outcome::MultipleFaces => "Multiple faces detected in the image",
            Outcome::Error => "Error in file registration",
            Outcome::Success => "Person registered successfully",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_name() {
        let event = ImageCreatedEvent {
            name: "photo42".to_string(),
            extension: "jpg".to_string(),
            url: "https://example.com/images/photo42.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            metadata: HashMap::new(),
        };

        assert_eq!(event.blob_name(), "photo42.jpg");
        assert_eq!(event.device_id(), None);
    }

    #[test]
    fn test_device_id_from_metadata() {
        let mut metadata = HashMap::new();
        metadata.insert(DEVICE_ID_METADATA_KEY.to_string(), "device-1".to_string());

        let event = ImageCreatedEvent {
            name: "photo42".to_string(),
            extension: "jpg".to_string(),
            url: "https://example.com/images/photo42.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            metadata,
        };

        assert_eq!(event.device_id(), Some("device-1"));
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(Outcome::IncorrectFormat.message(), "Incorrect Image Format");
        assert_eq!(Outcome::NoFaces.message(), "The are not faces in the photo");
        assert_eq!(
            Outcome::MultipleFaces.message(),
            "Multiple faces detected in the image"
        );
        assert_eq!(Outcome::Error.message(), "Error in file registration");
        assert_eq!(Outcome::Success.message(), "Person registered successfully");
    }

    #[test]
    fn test_event_deserializes_without_metadata() {
        let json = serde_json::json!({
            "name": "photo42",
            "extension": "jpg",
            "url": "https://example.com/images/photo42.jpg",
            "contentType": "image/jpeg"
        });

        let event: ImageCreatedEvent = serde_json::from_value(json).unwrap();
        assert!(event.metadata.is_empty());
    }
}
