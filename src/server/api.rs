use crate::agent::ChatAgent;
use crate::models::chat::{ ChatRequest, ChatResponse, ErrorResponse, HealthStatus };
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{ State, rejection::JsonRejection },
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, warn, error };
use uuid::Uuid;

/// Shown to visitors whenever the provider side fails; details stay in the log.
pub const PROVIDER_FAILURE_MESSAGE: &str =
    "Sorry, I'm having trouble responding right now. Please try again in a moment.";

#[derive(Clone)]
pub struct AppState {
    agent: Arc<ChatAgent>,
}

impl AppState {
    pub fn new(agent: Arc<ChatAgent>) -> Self {
        Self { agent }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Message is required")]
    MissingMessage,
    #[error("Invalid request body: {0}")]
    MalformedBody(String),
    #[error("{}", PROVIDER_FAILURE_MESSAGE)]
    Provider,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingMessage | ApiError::MalformedBody(_) =>
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse { error: self.to_string(), success: false }),
                ).into_response(),
            ApiError::Provider =>
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ChatResponse { response: self.to_string(), success: false }),
                ).into_response(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/health", get(health_handler))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("Rejected chat request: {}", rejection.body_text());
        ApiError::MalformedBody(rejection.body_text())
    })?;
    let message = req.message().ok_or(ApiError::MissingMessage)?;

    let request_id = Uuid::new_v4();
    info!(
        "[{}] Chat request from {} ({} history turns)",
        request_id,
        req.user_id(),
        req.history.len()
    );

    match state.agent.chat(message, &req.history, req.user_id()).await {
        Ok(response) => {
            info!("[{}] Replied with {} chars", request_id, response.len());
            Ok(Json(ChatResponse { response, success: true }))
        }
        Err(e) => {
            error!("[{}] Error in chat endpoint: {}", request_id, e);
            Err(ApiError::Provider)
        }
    }
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus::healthy())
}
