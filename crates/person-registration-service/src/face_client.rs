//! Client for the face detection backend

use async_trait::async_trait;
use registration_common::{Error, Result};
use tracing::debug;

use crate::models::FaceDescriptor;

/// Narrow seam over the face detection backend
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Detect faces in an image reachable at `url`
    ///
    /// Returns `Ok(None)` when the backend answered with a non-success
    /// status (detection unavailable), `Ok(Some(faces))` otherwise.
    /// Transport errors propagate.
    async fn detect(&self, url: &str) -> Result<Option<Vec<FaceDescriptor>>>;
}

/// Face API client
pub struct FaceClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl FaceClient {
    /// Create a new face client for the given API zone
    pub fn new(zone: &str, api_key: String) -> Self {
        Self {
            endpoint: format!(
                "https://{}.api.cognitive.microsoft.com/face/v1.0/detect",
                zone
            ),
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl FaceDetector for FaceClient {
    async fn detect(&self, url: &str) -> Result<Option<Vec<FaceDescriptor>>> {
        debug!("Detecting faces for image: {}", url);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .map_err(|e| Error::Detection(e.to_string()))?;

        if !response.status().is_success() {
            debug!("Face detection backend returned {}", response.status());
            return Ok(None);
        }

        let faces: Vec<FaceDescriptor> = response
            .json()
            .await
            .map_err(|e| Error::Detection(format!("Failed to parse detection response: {}", e)))?;

        debug!("Detected {} face(s)", faces.len());

        Ok(Some(faces))
    }
}
