//! Person Registration Service
//!
//! HTTP entry points for device push registrations and image upload events

use anyhow::{Context, Result};
use person_registration_service::{
    create_router, AppState, BlobStore, Config, FaceClient, NotificationDispatcher,
    NotificationHubClient, RegistrationWorkflow,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "person_registration_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Starting Person Registration Service");
    info!("Face API zone: {}", config.vision_api_zone);
    info!("Notification hub: {}", config.hub_name);
    info!("Listening on {}", config.address());

    // Clients are constructed once and reused across invocations
    let hub = Arc::new(
        NotificationHubClient::from_connection_string(&config.hub_connection, &config.hub_name)
            .context("Failed to initialize notification hub client")?,
    );
    let dispatcher = Arc::new(NotificationDispatcher::new(hub));
    let face_detector = Arc::new(FaceClient::new(
        &config.vision_api_zone,
        config.vision_api_key.clone(),
    ));
    let image_store = Arc::new(BlobStore::new(config.storage_container_url.clone()));

    let workflow = RegistrationWorkflow::new(dispatcher.clone(), face_detector, image_store);

    // Create application state
    let state = AppState {
        dispatcher,
        workflow,
    };

    // Create router
    let app = create_router(state);

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(config.address())
        .await
        .context("Failed to bind to address")?;

    info!(
        "Person Registration Service running on http://{}",
        config.address()
    );

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
