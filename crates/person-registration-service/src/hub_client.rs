//! Client for the push notification hub backend
//!
//! Talks to the Azure Notification Hubs REST API: installation CRUD plus
//! tag-addressed and broadcast sends. Requests are authorized with a
//! short-lived SAS token derived from the hub connection string.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use registration_common::{Error, Installation, Platform, Result};

const API_VERSION: &str = "2015-01";

/// SAS token lifetime
const SAS_TTL_SECS: i64 = 300;

/// Narrow seam over the push notification backend
#[async_trait]
pub trait HubBackend: Send + Sync {
    /// Fetch an installation by id; `Ok(None)` when unknown
    async fn get_installation(&self, installation_id: &str) -> Result<Option<Installation>>;

    /// Create or overwrite an installation record
    async fn upsert_installation(&self, installation: &Installation) -> Result<()>;

    /// Delete an installation record
    async fn delete_installation(&self, installation_id: &str) -> Result<()>;

    /// Send a platform-native payload to installations matching `tag`,
    /// or to every installation of the platform when `tag` is `None`
    async fn send(
        &self,
        platform: Platform,
        payload: &serde_json::Value,
        tag: Option<&str>,
    ) -> Result<()>;
}

/// Notification hub REST client
pub struct NotificationHubClient {
    base_url: String,
    key_name: String,
    key: Vec<u8>,
    client: reqwest::Client,
}

impl NotificationHubClient {
    /// Build a client from a hub connection string
    ///
    /// Expects the `Endpoint=sb://...;SharedAccessKeyName=...;SharedAccessKey=...`
    /// form issued by the hub namespace.
    pub fn from_connection_string(connection: &str, hub_name: &str) -> Result<Self> {
        let mut endpoint = None;
        let mut key_name = None;
        let mut key = None;

        for part in connection.split(';') {
            if let Some(value) = part.strip_prefix("Endpoint=") {
                endpoint = Some(value.to_string());
            } else if let Some(value) = part.strip_prefix("SharedAccessKeyName=") {
                key_name = Some(value.to_string());
            } else if let Some(value) = part.strip_prefix("SharedAccessKey=") {
                key = Some(value.to_string());
            }
        }

        let endpoint =
            endpoint.ok_or_else(|| Error::Hub("Connection string missing Endpoint".to_string()))?;
        let key_name = key_name
            .ok_or_else(|| Error::Hub("Connection string missing SharedAccessKeyName".to_string()))?;
        let key =
            key.ok_or_else(|| Error::Hub("Connection string missing SharedAccessKey".to_string()))?;

        let base = endpoint.replacen("sb://", "https://", 1);
        let base_url = format!("{}/{}", base.trim_end_matches('/'), hub_name);

        Ok(Self {
            base_url,
            key_name,
            key: key.into_bytes(),
            client: reqwest::Client::new(),
        })
    }

    /// Generate a SAS token authorizing one request against `uri`
    fn sas_token(&self, uri: &str) -> String {
        let expiry = chrono::Utc::now().timestamp() + SAS_TTL_SECS;
        let target = percent_encode(&uri.to_lowercase());
        let to_sign = format!("{}\n{}", target, expiry);

        // HMAC accepts keys of any length
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key)
            .expect("HMAC key of any length is valid");
        mac.update(to_sign.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        format!(
            "SharedAccessSignature sr={}&sig={}&se={}&skn={}",
            target,
            percent_encode(&signature),
            expiry,
            self.key_name
        )
    }

    fn installation_url(&self, installation_id: &str) -> String {
        format!(
            "{}/installations/{}?api-version={}",
            self.base_url, installation_id, API_VERSION
        )
    }

    fn messages_url(&self) -> String {
        format!("{}/messages/?api-version={}", self.base_url, API_VERSION)
    }

    fn notification_format(platform: Platform) -> &'static str {
        match platform {
            Platform::Fcm => "gcm",
            Platform::Apns => "apple",
        }
    }
}

#[async_trait]
impl HubBackend for NotificationHubClient {
    async fn get_installation(&self, installation_id: &str) -> Result<Option<Installation>> {
        let url = self.installation_url(installation_id);
        debug!("Fetching installation: {}", installation_id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.sas_token(&url))
            .send()
            .await
            .map_err(|e| Error::Hub(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(Error::Hub(format!(
                "Failed to fetch installation {}: {}",
                installation_id,
                response.status()
            )));
        }

        let installation: Installation = response
            .json()
            .await
            .map_err(|e| Error::Hub(format!("Failed to parse installation: {}", e)))?;

        Ok(Some(installation))
    }

    async fn upsert_installation(&self, installation: &Installation) -> Result<()> {
        let url = self.installation_url(&installation.installation_id);
        debug!("Upserting installation: {}", installation.installation_id);

        let response = self
            .client
            .put(&url)
            .header("Authorization", self.sas_token(&url))
            .json(installation)
            .send()
            .await
            .map_err(|e| Error::Hub(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Hub(format!(
                "Failed to upsert installation {}: {}",
                installation.installation_id,
                response.status()
            )));
        }

        Ok(())
    }

    async fn delete_installation(&self, installation_id: &str) -> Result<()> {
        let url = self.installation_url(installation_id);
        debug!("Deleting installation: {}", installation_id);

        let response = self
            .client
            .delete(&url)
            .header("Authorization", self.sas_token(&url))
            .send()
            .await
            .map_err(|e| Error::Hub(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Hub(format!(
                "Failed to delete installation {}: {}",
                installation_id,
                response.status()
            )));
        }

        Ok(())
    }

    async fn send(
        &self,
        platform: Platform,
        payload: &serde_json::Value,
        tag: Option<&str>,
    ) -> Result<()> {
        let url = self.messages_url();
        debug!("Sending {} notification, tag: {:?}", platform.as_str(), tag);

        let mut request = self
            .client
            .post(&url)
            .header("Authorization", self.sas_token(&url))
            .header(
                "ServiceBusNotification-Format",
                Self::notification_format(platform),
            )
            .json(payload);

        if let Some(tag) = tag {
            request = request.header("ServiceBusNotification-Tags", tag);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Hub(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Hub(format!(
                "Failed to send {} notification: {}",
                platform.as_str(),
                response.status()
            )));
        }

        Ok(())
    }
}

/// Percent-encode a string per RFC 3986 unreserved characters
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}
