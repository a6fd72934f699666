//! Notification dispatcher
//!
//! Registration, tagging and send operations against the push notification
//! backend. Every operation returns an explicit `Result`; callers decide
//! whether a failure is fatal or log-and-continue.

use std::sync::Arc;
use tracing::{info, warn};

use registration_common::{request_tag, DeviceInstallation, Error, Installation, Platform, Result};

use crate::hub_client::HubBackend;

/// Dispatcher over the notification hub backend
pub struct NotificationDispatcher {
    hub: Arc<dyn HubBackend>,
}

impl NotificationDispatcher {
    pub fn new(hub: Arc<dyn HubBackend>) -> Self {
        Self { hub }
    }

    /// Register or update a device installation with an empty tag set
    ///
    /// Fails with [`Error::InvalidPlatform`] before any hub write when the
    /// platform string is not recognized.
    pub async fn register(&self, device: &DeviceInstallation) -> Result<()> {
        let installation = Installation::from_registration(device)?;
        self.hub.upsert_installation(&installation).await?;
        info!("Device was registered: {}", installation.installation_id);
        Ok(())
    }

    /// Associate a device with a registration request
    pub async fn tag_for_request(&self, installation_id: &str, request_id: &str) -> Result<()> {
        self.add_tag(installation_id, &request_tag(request_id)).await?;
        info!(
            "Device {} was registered in the request {}",
            installation_id, request_id
        );
        Ok(())
    }

    /// Remove a device from a registration request
    pub async fn untag_from_request(&self, installation_id: &str, request_id: &str) -> Result<()> {
        self.remove_tag(installation_id, &request_tag(request_id)).await?;
        info!(
            "Device {} was removed from the request {}",
            installation_id, request_id
        );
        Ok(())
    }

    /// Delete a device installation
    pub async fn unregister(&self, installation_id: &str) -> Result<()> {
        self.hub.delete_installation(installation_id).await
    }

    /// Send a notification text to the device associated with `request_id`
    ///
    /// The installation is fetched to pick the platform-native envelope; the
    /// send itself is addressed by the request tag.
    pub async fn send(&self, text: &str, request_id: &str, installation_id: &str) -> Result<()> {
        let installation = self.get_required(installation_id).await?;
        let payload = platform_payload(installation.platform, text);
        let tag = request_tag(request_id);

        self.hub
            .send(installation.platform, &payload, Some(&tag))
            .await?;

        info!(
            "{} notification was sent for request {}",
            installation.platform.as_str(),
            request_id
        );
        Ok(())
    }

    /// Send a notification text to every installation of both platforms
    ///
    /// Platforms are attempted independently; a platform with no registered
    /// devices fails on its own without suppressing the other. `Err` only
    /// when both platforms fail.
    pub async fn send_broadcast(&self, text: &str) -> Result<()> {
        let mut failures = Vec::new();

        for platform in [Platform::Fcm, Platform::Apns] {
            let payload = platform_payload(platform, text);
            match self.hub.send(platform, &payload, None).await {
                Ok(()) => info!("{} broadcast was sent", platform.as_str()),
                Err(e) => {
                    warn!("{} broadcast failed: {}", platform.as_str(), e);
                    failures.push(e);
                }
            }
        }

        if failures.len() == 2 {
            return Err(Error::Hub(format!(
                "Broadcast failed on both platforms: {}; {}",
                failures[0], failures[1]
            )));
        }

        Ok(())
    }

    async fn add_tag(&self, installation_id: &str, tag: &str) -> Result<()> {
        let mut installation = self.get_required(installation_id).await?;
        if !installation.tags.iter().any(|t| t == tag) {
            installation.tags.push(tag.to_string());
        }
        self.hub.upsert_installation(&installation).await
    }

    async fn remove_tag(&self, installation_id: &str, tag: &str) -> Result<()> {
        let mut installation = self.get_required(installation_id).await?;
        let before = installation.tags.len();
        installation.tags.retain(|t| t != tag);

        // No hub write when the tag was not present
        if installation.tags.len() == before {
            return Ok(());
        }

        self.hub.upsert_installation(&installation).await
    }

    async fn get_required(&self, installation_id: &str) -> Result<Installation> {
        self.hub
            .get_installation(installation_id)
            .await?
            .ok_or_else(|| Error::Hub(format!("Installation not found: {}", installation_id)))
    }
}

/// Platform-native notification envelope
pub fn platform_payload(platform: Platform, text: &str) -> serde_json::Value {
    match platform {
        Platform::Fcm => serde_json::json!({ "data": { "message": text } }),
        Platform::Apns => serde_json::json!({ "aps": { "alert": text } }),
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    pub(crate) struct SentMessage {
        pub platform: Platform,
        pub payload: serde_json::Value,
        pub tag: Option<String>,
    }

    /// In-memory hub backend recording every call
    #[derive(Default)]
    pub(crate) struct MockHub {
        pub installations: Mutex<HashMap<String, Installation>>,
        pub sent: Mutex<Vec<SentMessage>>,
        pub fail_fcm: bool,
        pub fail_apns: bool,
        pub fail_upserts: bool,
    }

    impl MockHub {
        pub fn with_installation(installation: Installation) -> Self {
            let hub = Self::default();
            hub.installations
                .lock()
                .unwrap()
                .insert(installation.installation_id.clone(), installation);
            hub
        }
    }

    #[async_trait]
    impl HubBackend for MockHub {
        async fn get_installation(&self, installation_id: &str) -> Result<Option<Installation>> {
            Ok(self
                .installations
                .lock()
                .unwrap()
                .get(installation_id)
                .cloned())
        }

        async fn upsert_installation(&self, installation: &Installation) -> Result<()> {
            if self.fail_upserts {
                return Err(Error::Hub("upsert failed".to_string()));
            }
            self.installations
                .lock()
                .unwrap()
                .insert(installation.installation_id.clone(), installation.clone());
            Ok(())
        }

        async fn delete_installation(&self, installation_id: &str) -> Result<()> {
            self.installations
                .lock()
                .unwrap()
                .remove(installation_id)
                .map(|_| ())
                .ok_or_else(|| Error::Hub(format!("Installation not found: {}", installation_id)))
        }

        async fn send(
            &self,
            platform: Platform,
            payload: &serde_json::Value,
            tag: Option<&str>,
        ) -> Result<()> {
            let failed = match platform {
                Platform::Fcm => self.fail_fcm,
                Platform::Apns => self.fail_apns,
            };
            if failed {
                return Err(Error::Hub(format!("{} send failed", platform.as_str())));
            }
            self.sent.lock().unwrap().push(SentMessage {
                platform,
                payload: payload.clone(),
                tag: tag.map(str::to_string),
            });
            Ok(())
        }
    }
}
