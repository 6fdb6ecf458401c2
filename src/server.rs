//! HTTP listener for registry callbacks
//!
//! Exposes two routes:
//!
//! - `POST /docker-webhook`: run the webhook pipeline, plain-text response
//! - `GET /health`: configuration snapshot, JSON response
//!
//! Benign and delivered outcomes answer 200; parse and delivery failures
//! answer 500. The mapping from [`RelayError`] to a response lives in one
//! place, the `IntoResponse` impl below.

use crate::config::Config;
use crate::error::RelayError;
use crate::gotify::{GotifyClient, NotificationSender};
use crate::webhook::{WatchFilter, WebhookHandler};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Path registries post push events to.
pub const WEBHOOK_PATH: &str = "/docker-webhook";

/// Liveness and configuration snapshot path.
pub const HEALTH_PATH: &str = "/health";

/// Shared, immutable state handed to every request.
#[derive(Clone)]
pub struct AppState {
    handler: WebhookHandler,
    gotify_url: Arc<str>,
}

impl AppState {
    /// Create state from a handler and the Gotify URL reported by `/health`.
    pub fn new(handler: WebhookHandler, gotify_url: impl Into<Arc<str>>) -> Self {
        Self {
            handler,
            gotify_url: gotify_url.into(),
        }
    }

    /// Build state from validated configuration, delivering through Gotify.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Config` if the token or watch-list is missing,
    /// or the HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self, RelayError> {
        let watch_list = config.watch_list()?;
        let client_config = config.gotify_client_config()?;
        let client = GotifyClient::new(client_config)
            .map_err(|e| RelayError::Config(format!("Failed to build Gotify client: {}", e)))?;

        let sender: Arc<dyn NotificationSender> = Arc::new(client);
        let handler = WebhookHandler::new(WatchFilter::new(watch_list), sender);

        Ok(Self::new(handler, config.gotify.url.as_str()))
    }
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `running`.
    pub status: &'static str,
    /// Configured Gotify base URL.
    pub gotify_url: String,
    /// Watch-list in configured order.
    pub watched_images: Vec<String>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(docker_webhook))
        .route(HEALTH_PATH, get(health))
        .with_state(state)
}

async fn docker_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, String), RelayError> {
    let span = info_span!("webhook", request_id = %Uuid::new_v4());

    async move {
        let outcome = state.handler.handle(&body).await?;
        Ok::<_, RelayError>((StatusCode::OK, outcome.message()))
    }
    .instrument(span)
    .await
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running",
        gotify_url: state.gotify_url.to_string(),
        watched_images: state.handler.filter().watch_list().images().to_vec(),
    })
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = match &self {
            RelayError::Delivery(_) => "Failed to send notification",
            _ => "Error processing webhook",
        };

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Validate configuration, bind the listener and serve until shutdown.
///
/// Configuration is checked before binding, so a process with a missing
/// token or an empty watch-list never opens its port.
///
/// # Errors
///
/// Returns error if configuration is invalid, the address cannot be bound,
/// or the server fails
pub async fn run(config: Config) -> crate::error::Result<()> {
    config.validate()?;
    let addr = config.listen_addr()?;
    let state = AppState::from_config(&config)?;

    info!(
        gotify_url = %config.gotify.url,
        filters = %state.handler.filter().summary(),
        "Starting tagwatch relay"
    );

    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening for registry webhooks");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
