use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid platform: {0}")]
    InvalidPlatform(String),

    #[error("Notification hub error: {0}")]
    Hub(String),

    #[error("Face detection error: {0}")]
    Detection(String),

    #[error("Image store error: {0}")]
    Storage(String),

    #[error("Missing blob metadata: {0}")]
    MissingMetadata(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
