use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Fixed message surfaced when a client is hard blocked.
pub const FLOOD_CONTROL_MESSAGE: &str = "flood control - login blocked";

#[derive(Debug, Error)]
pub enum ShieldError {
    /// Terminal flood-control condition: the client strictly exceeded the
    /// hard block limit. Stops all further processing of the request.
    #[error("flood control - login blocked")]
    FloodBlocked,

    /// The attempt backend was unreachable and the configured policy is
    /// fail-closed.
    #[error("Attempt tracker unavailable: {0}")]
    TrackerUnavailable(String),
}

impl IntoResponse for ShieldError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ShieldError::FloodBlocked => (
                StatusCode::INTERNAL_SERVER_ERROR,
                FLOOD_CONTROL_MESSAGE.to_string(),
            ),
            ShieldError::TrackerUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(json!({
            "error": error_message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}
