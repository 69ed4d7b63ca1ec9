//! HTTP Transport
//!
//! A thin request/response layer over the command handler. One endpoint
//! does the work:
//!
//! - `POST /execute` with `{"command": "<line>"}` runs the line and
//!   answers `200 {"response": [...]}` on success or
//!   `400 {"error": "<message>"}` on failure. Commands with nothing to
//!   report come back as `{"response": ["OK"]}`.
//! - `GET /health` answers `200 OK` for liveness probes.
//!
//! The command line is handed to the dispatcher exactly as received; no
//! tokenization happens here.

use crate::commands::{CommandError, CommandHandler};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Request body for `POST /execute`.
#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    /// The raw command line
    pub command: String,
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub response: Vec<String>,
}

/// Error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wraps a [`CommandError`] for the HTTP boundary: every command failure
/// maps to a 400 with the error envelope.
struct ApiError(CommandError);

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        debug!(error = %message, "command failed");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: message }),
        )
            .into_response()
    }
}

/// Builds the application router.
pub fn router(handler: CommandHandler) -> Router {
    Router::new()
        .route("/execute", post(execute))
        .route("/health", get(health))
        .with_state(handler)
}

/// `POST /execute` - run one command line.
async fn execute(
    State(handler): State<CommandHandler>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let response = handler
        .handle(&request.command)?
        .unwrap_or_else(|| vec!["OK".to_string()]);
    Ok(Json(ExecuteResponse { response }))
}

/// `GET /health` - liveness probe.
async fn health() -> &'static str {
    "OK"
}

/// Serves the router until ctrl-c.
pub async fn serve(listener: TcpListener, handler: CommandHandler) -> anyhow::Result<()> {
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(handler))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Shutdown signal received, stopping server...");
}
