//! HTTP request handlers

use super::types::{ErrorResponse, InboundError, TurnResponse, UploadResponse, WebhookRequest};
use super::AppState;
use crate::agent::AgentError;
use crate::layer::LayerError;
use crate::runtime::{InboundMessage, RouterError};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

const UPLOAD_FIELD: &str = "file";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Platform webhook for customer messages
        .route("/api/v1/message/received", post(message_received))
        // Layer tree upload
        .route("/api/v1/app/upload", post(upload_layer))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Webhook
// ============================================================

async fn message_received(
    State(state): State<AppState>,
    Json(request): Json<WebhookRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let inbound = InboundMessage::try_from(request)?;
    let turn = state.runtime.handle(inbound).await?;

    Ok(Json(TurnResponse {
        drafts: turn.drafts.len(),
        routing: turn.drafts.last().map_or("none", |d| d.routing.as_str()),
    }))
}

// ============================================================
// Layer Upload
// ============================================================

async fn upload_layer(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("Upload has no file name".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let path = state.layers.save(&filename, &bytes).await?;
        return Ok(Json(UploadResponse {
            path: path.display().to_string(),
        }));
    }

    Err(AppError::BadRequest(format!(
        "Missing multipart field '{UPLOAD_FIELD}'"
    )))
}

async fn get_version() -> &'static str {
    concat!("bot-router ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Unprocessable(String),
    BadGateway(String),
    Unavailable(String),
    Internal(String),
}

impl From<InboundError> for AppError {
    fn from(e: InboundError) -> Self {
        AppError::Unprocessable(e.to_string())
    }
}

impl From<LayerError> for AppError {
    fn from(e: LayerError) -> Self {
        match e {
            LayerError::ConfigInvalid { .. } => AppError::BadRequest(e.to_string()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<RouterError> for AppError {
    fn from(e: RouterError) -> Self {
        tracing::error!(error = %e, "Turn failed");
        match e {
            RouterError::Platform(_) | RouterError::Agent(AgentError::Platform(_)) => {
                AppError::BadGateway(e.to_string())
            }
            RouterError::Agent(AgentError::NoAgentAvailable { .. }) => {
                AppError::Unavailable(e.to_string())
            }
            RouterError::Layer(_) | RouterError::Form(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
