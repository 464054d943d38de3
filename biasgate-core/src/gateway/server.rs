//! HTTP gateway built on axum.

use crate::config::{BiasConfig, ServerConfig};
use crate::detector::BiasDetector;
use crate::error::BiasError;
use crate::roster::CheckBiasRequest;
use crate::verdict::Verdict;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn};
use uuid::Uuid;

/// Immutable state shared by every handler.
#[derive(Debug, Clone)]
pub struct GatewayState {
    detector: BiasDetector,
    service_name: String,
}

/// Thread-safe shared state reference for axum handlers.
pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(detector: BiasDetector, service_name: impl Into<String>) -> Self {
        Self {
            detector,
            service_name: service_name.into(),
        }
    }

    pub fn from_config(config: &BiasConfig) -> Self {
        Self::new(BiasDetector::new(config), config.server.service_name.clone())
    }

    pub fn detector(&self) -> &BiasDetector {
        &self.detector
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

/// Build the axum Router with `/check-bias` and `/health` routes. CORS is open
/// to every origin. A panicking handler yields a 500 instead of tearing down
/// the connection task.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/check-bias", post(check_bias_handler))
        .route("/health", get(health_handler))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Screen a roster and return the verdict.
async fn check_bias_handler(
    State(state): State<SharedState>,
    payload: Result<Json<CheckBiasRequest>, JsonRejection>,
) -> Result<Json<Verdict>, BiasError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(status = %rejection.status(), "Malformed request: {}", rejection.body_text());
        BiasError::malformed(rejection.body_text())
    })?;

    let request_id = Uuid::new_v4();
    let trial_id = request.trial_id();
    let patients = request.patients();
    let span = info_span!("check_bias", %request_id, trial_id);

    let verdict = span.in_scope(|| {
        info!(
            "Checking trial {} with {} patients",
            trial_id,
            patients.len()
        );
        state.detector.evaluate(trial_id, patients)
    })?;
    Ok(Json(verdict))
}

/// Health check endpoint.
async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": state.service_name(),
    }))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(details, "Handler panicked");
    let body = serde_json::json!({
        "error": "INTERNAL_ERROR",
        "message": "Internal error while screening roster",
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

impl IntoResponse for BiasError {
    fn into_response(self) -> Response {
        let status = match self {
            BiasError::MalformedRequest { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn run(state: SharedState, config: &ServerConfig) -> Result<(), std::io::Error> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local = listener.local_addr()?;
    info!(address = %local, service = state.service_name(), "Bias detection service listening");
    info!("Endpoints: POST /check-bias, GET /health");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Bias detection service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}
