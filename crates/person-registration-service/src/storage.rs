//! Image blob store adapter

use async_trait::async_trait;
use registration_common::{Error, Result};
use tracing::debug;

/// Narrow seam over the image blob store
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Delete the named blob from the image container
    async fn delete(&self, blob_name: &str) -> Result<()>;
}

/// Blob store client for the image container
pub struct BlobStore {
    container_url: String,
    client: reqwest::Client,
}

impl BlobStore {
    /// Create a new blob store client
    ///
    /// `container_url` is the container base URL including any access token
    /// query string required by the storage account.
    pub fn new(container_url: String) -> Self {
        Self {
            container_url: container_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn blob_url(&self, blob_name: &str) -> String {
        // Keep an access token query string after the blob name
        match self.container_url.split_once('?') {
            Some((base, query)) => format!("{}/{}?{}", base, blob_name, query),
            None => format!("{}/{}", self.container_url, blob_name),
        }
    }
}

#[async_trait]
impl ImageStore for BlobStore {
    async fn delete(&self, blob_name: &str) -> Result<()> {
        let url = self.blob_url(blob_name);
        debug!("Deleting blob: {}", blob_name);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Storage(format!(
                "Failed to delete blob {}: {}",
                blob_name,
                response.status()
            )));
        }

        Ok(())
    }
}
