//! Installation records for the push notification registry

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Push notification platform of a registered device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Apns,
    Fcm,
}

impl Platform {
    /// Parse the platform string from a registration payload
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "apns" => Ok(Platform::Apns),
            "fcm" => Ok(Platform::Fcm),
            other => Err(Error::InvalidPlatform(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Apns => "apns",
            Platform::Fcm => "fcm",
        }
    }
}

/// Device registration payload received over HTTP
///
/// The platform arrives as a raw string and is validated against [`Platform`]
/// when the registry record is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInstallation {
    /// Unique device installation identifier
    pub installation_id: String,

    /// Opaque platform push token
    pub push_channel: String,

    /// Platform string, "apns" or "fcm"
    pub platform: String,
}

/// Registry-side installation record
///
/// Mirrors the latest registration payload for a given installation id, plus
/// the set of tags used for topic-style notification addressing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub installation_id: String,
    pub push_channel: String,
    pub platform: Platform,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Installation {
    /// Build a registry record from a registration payload, with no tags
    pub fn from_registration(device: &DeviceInstallation) -> Result<Self> {
        Ok(Self {
            installation_id: device.installation_id.clone(),
            push_channel: device.push_channel.clone(),
            platform: Platform::parse(&device.platform)?,
            tags: Vec::new(),
        })
    }
}

/// Tag associating a device with a specific in-flight registration request
///
/// At most one device is associated with a given request tag at a time.
pub fn request_tag(request_id: &str) -> String {
    format!("requestId:{}", request_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse_valid() {
        assert_eq!(Platform::parse("apns").unwrap(), Platform::Apns);
        assert_eq!(Platform::parse("fcm").unwrap(), Platform::Fcm);
    }

    #[test]
    fn test_platform_parse_invalid() {
        let result = Platform::parse("wns");
        assert!(matches!(result, Err(Error::InvalidPlatform(_))));
        assert!(result.unwrap_err().to_string().contains("wns"));
    }

    #[test]
    fn test_from_registration_empty_tags() {
        let device = DeviceInstallation {
            installation_id: "device-1".to_string(),
            push_channel: "token".to_string(),
            platform: "fcm".to_string(),
        };

        let installation = Installation::from_registration(&device).unwrap();
        assert_eq!(installation.installation_id, "device-1");
        assert_eq!(installation.push_channel, "token");
        assert_eq!(installation.platform, Platform::Fcm);
        assert!(installation.tags.is_empty());
    }

    #[test]
    fn test_from_registration_rejects_unknown_platform() {
        let device = DeviceInstallation {
            installation_id: "device-1".to_string(),
            push_channel: "token".to_string(),
            platform: "sms".to_string(),
        };

        assert!(matches!(
            Installation::from_registration(&device),
            Err(Error::InvalidPlatform(_))
        ));
    }

    #[test]
    fn test_request_tag_format() {
        assert_eq!(request_tag("photo42"), "requestId:photo42");
    }

    #[test]
    fn test_installation_serde_round_trip() {
        let installation = Installation {
            installation_id: "device-1".to_string(),
            push_channel: "token".to_string(),
            platform: Platform::Apns,
            tags: vec![request_tag("r1")],
        };

        let json = serde_json::to_value(&installation).unwrap();
        assert_eq!(json["installationId"], "device-1");
        assert_eq!(json["platform"], "apns");

        let back: Installation = serde_json::from_value(json).unwrap();
        assert_eq!(back.tags, vec!["requestId:r1"]);
    }
}
