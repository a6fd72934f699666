//! API request handlers for the Person Registration Service

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use registration_common::{DeviceInstallation, Error};

use crate::models::{ImageCreatedEvent, Outcome, DEVICE_ID_METADATA_KEY};
use crate::notifications::NotificationDispatcher;
use crate::workflow::RegistrationWorkflow;

/// Shared application state
pub struct AppState {
    pub dispatcher: Arc<NotificationDispatcher>,
    pub workflow: RegistrationWorkflow,
}

/// API Error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message
        });

        (self.status, Json(body)).into_response()
    }
}

/// Response for an image registration event
#[derive(Debug, Serialize)]
pub struct ImageEventResponse {
    pub outcome: Outcome,
    pub message: &'static str,
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "person-registration-service"
    }))
}

/// Register a mobile device for push notifications
///
/// Responds 200 on success, otherwise 500 with a static error body. The
/// specific cause is logged, not surfaced to the caller.
pub async fn register_device_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeviceInstallation>, JsonRejection>,
) -> Response {
    info!("New device registration incoming");

    let Json(device) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            error!("Malformed device registration payload: {}", rejection);
            return registration_error();
        }
    };

    match state.dispatcher.register(&device).await {
        Ok(()) => {
            info!("New device registered");
            StatusCode::OK.into_response()
        }
        Err(e) => {
            error!("Error during device registration: {}", e);
            registration_error()
        }
    }
}

fn registration_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Error during device registration",
    )
        .into_response()
}

/// Run the image registration workflow for a blob-created event
pub async fn image_event_handler(
    State(state): State<Arc<AppState>>,
    Json(event): Json<ImageCreatedEvent>,
) -> Result<Json<ImageEventResponse>, ApiError> {
    let device_id = match event.device_id() {
        Some(id) => id.to_string(),
        None => {
            let err = Error::MissingMetadata(DEVICE_ID_METADATA_KEY.to_string());
            return Err(ApiError {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            });
        }
    };

    let outcome = state.workflow.run(&event, &device_id).await;

    Ok(Json(ImageEventResponse {
        outcome,
        message: outcome.message(),
    }))
}
