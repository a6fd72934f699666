//! Person Registration Service
//!
//! Receives mobile device push notification registrations over HTTP and
//! reacts to image upload events by calling a face detection backend and
//! sending a push notification reporting the outcome.

pub mod config;
pub mod face_client;
pub mod handlers;
pub mod hub_client;
pub mod models;
pub mod notifications;
pub mod storage;
pub mod workflow;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use face_client::{FaceClient, FaceDetector};
pub use handlers::AppState;
pub use hub_client::{HubBackend, NotificationHubClient};
pub use models::{FaceDescriptor, ImageCreatedEvent, Outcome};
pub use notifications::NotificationDispatcher;
pub use storage::{BlobStore, ImageStore};
pub use workflow::RegistrationWorkflow;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/devicenotificationsregistrations/",
            put(handlers::register_device_handler),
        )
        .route("/events/images", post(handlers::image_event_handler))
        .with_state(shared_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
