//! HTTP endpoint handlers

use std::sync::{atomic::Ordering, Arc};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, warn};

use crate::state::AppState;
use super::{
    requests::{translate, CommandRequest, TARGETS},
    responses::{HealthResponse, StatusResponse},
};

type TextResponse = (StatusCode, String);

fn dispatch(state: &AppState, request: &CommandRequest) -> TextResponse {
    let outbound = match translate(request) {
        Ok(outbound) => outbound,
        Err(reason) => {
            warn!("Rejected command request: {}", reason);
            state.record_rejection();
            return (StatusCode::BAD_REQUEST, reason);
        }
    };

    let payload = match serde_json::to_vec(&outbound.payload) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to encode command: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode command".to_string());
        }
    };

    match state.publish_command(outbound.topic, payload, &outbound.summary) {
        Ok(()) => (StatusCode::OK, "OK".to_string()),
        Err(e) => {
            error!("Failed to publish to {}: {}", outbound.topic, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to publish to MQTT".to_string())
        }
    }
}

/// Handle GET /command - Fields from the query string
pub async fn command_query_handler(
    State(state): State<Arc<AppState>>,
    Query(request): Query<CommandRequest>,
) -> TextResponse {
    dispatch(&state, &request)
}

/// Handle POST /command - Fields from a JSON body, an empty body counts as no fields
pub async fn command_body_handler(State(state): State<Arc<AppState>>, body: Bytes) -> TextResponse {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CommandRequest::default()
    } else {
        match serde_json::from_slice::<CommandRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                warn!("Rejected command body: {}", e);
                state.record_rejection();
                return (StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e));
            }
        }
    };
    dispatch(&state, &request)
}

/// Handle GET /status - Return gateway status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_command, last_command_time) = state.get_last_command();

    Json(StatusResponse {
        broker_connected: state.broker_connected(),
        targets: TARGETS.iter().map(|(name, _)| name.to_string()).collect(),
        published: state.published.load(Ordering::Relaxed),
        rejected: state.rejected.load(Ordering::Relaxed),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_command,
        last_command_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
