//! Configuration management for the Person Registration Service
//!
//! Loads configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub host: String,

    /// HTTP server port
    pub port: u16,

    /// Base URL of the blob container holding uploaded images
    pub storage_container_url: String,

    /// Face API subscription key
    pub vision_api_key: String,

    /// Face API zone, e.g. "westus"
    pub vision_api_zone: String,

    /// Notification hub connection string
    pub hub_connection: String,

    /// Notification hub name
    pub hub_name: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            storage_container_url: env::var("STORAGE_CONTAINER_URL")
                .context("STORAGE_CONTAINER_URL is required")?,

            vision_api_key: env::var("VISION_API_KEY").context("VISION_API_KEY is required")?,

            vision_api_zone: env::var("VISION_API_ZONE")
                .unwrap_or_else(|_| "westus".to_string()),

            hub_connection: env::var("NOTIFICATION_HUB_CONNECTION")
                .context("NOTIFICATION_HUB_CONNECTION is required")?,

            hub_name: env::var("NOTIFICATION_HUB_NAME")
                .context("NOTIFICATION_HUB_NAME is required")?,
        };

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("PORT must be greater than 0");
        }

        if self.vision_api_key.is_empty() {
            anyhow::bail!("VISION_API_KEY must not be empty");
        }

        if self.vision_api_zone.is_empty() {
            anyhow::bail!("VISION_API_ZONE must not be empty");
        }

        if self.hub_name.is_empty() {
            anyhow::bail!("NOTIFICATION_HUB_NAME must not be empty");
        }

        Ok(())
    }

    /// Get the HTTP server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
