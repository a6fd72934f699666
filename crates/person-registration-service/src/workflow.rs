//! Image registration workflow
//!
//! Sequence of validations and notification side effects triggered by a new
//! image arriving in storage: associate the device with the request, detect
//! faces, validate format and face count, and report exactly one outcome
//! notification addressed by the request tag.

use std::sync::Arc;
use tracing::{info, warn};

use registration_common::{Error, Result};

use crate::face_client::FaceDetector;
use crate::models::{ImageCreatedEvent, Outcome};
use crate::notifications::NotificationDispatcher;
use crate::storage::ImageStore;

/// The single accepted image content type
const ACCEPTED_CONTENT_TYPE: &str = "image/jpeg";

/// The image registration workflow over injected collaborators
pub struct RegistrationWorkflow {
    dispatcher: Arc<NotificationDispatcher>,
    face_detector: Arc<dyn FaceDetector>,
    image_store: Arc<dyn ImageStore>,
}

impl RegistrationWorkflow {
    pub fn new(
        dispatcher: Arc<NotificationDispatcher>,
        face_detector: Arc<dyn FaceDetector>,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            dispatcher,
            face_detector,
            image_store,
        }
    }

    /// Run the workflow for one blob-created event
    ///
    /// The blob name is the requestId; `device_id` comes from the blob
    /// metadata. Whichever branch terminates the run, one outcome
    /// notification is sent to the request tag.
    pub async fn run(&self, event: &ImageCreatedEvent, device_id: &str) -> Outcome {
        let request_id = &event.name;
        info!("Image: {}", event.blob_name());

        // Association failure must not block outcome reporting
        if let Err(e) = self.dispatcher.tag_for_request(device_id, request_id).await {
            warn!(
                "Failed to associate device {} with request {}: {}",
                device_id, request_id, e
            );
        }

        let outcome = match self.evaluate(event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // The image is intentionally left in place on this path
                warn!("Error in file {}: {}", event.blob_name(), e);
                Outcome::Error
            }
        };

        if let Err(e) = self
            .dispatcher
            .send(outcome.message(), request_id, device_id)
            .await
        {
            warn!(
                "Failed to send outcome notification for request {}: {}",
                request_id, e
            );
        }

        outcome
    }

    /// Detect faces, then validate format and face count
    ///
    /// Rejected images are deleted from storage before the outcome is
    /// returned; the success path keeps the image.
    async fn evaluate(&self, event: &ImageCreatedEvent) -> Result<Outcome> {
        let faces = self
            .face_detector
            .detect(&event.url)
            .await?
            .ok_or_else(|| Error::Detection("Detection backend unavailable".to_string()))?;

        if event.content_type != ACCEPTED_CONTENT_TYPE {
            info!("no valid content type for: {}", event.blob_name());
            self.image_store.delete(&event.blob_name()).await?;
            return Ok(Outcome::IncorrectFormat);
        }

        if faces.is_empty() {
            info!("there are no faces in the image: {}", event.blob_name());
            self.image_store.delete(&event.blob_name()).await?;
            return Ok(Outcome::NoFaces);
        }

        if faces.len() > 1 {
            info!("multiple faces detected in the image: {}", event.blob_name());
            self.image_store.delete(&event.blob_name()).await?;
            return Ok(Outcome::MultipleFaces);
        }

        info!("person registered successfully");
        Ok(Outcome::Success)
    }
}
