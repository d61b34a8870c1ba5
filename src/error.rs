use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failure to deliver a notification to the webhook.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("webhook returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Per-request errors on /contact. None of these are fatal to the process;
/// each one maps to a JSON error response for the offending request only.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Email, Subject and message are required")]
    MissingFields,
    #[error("Rate limit exceeded: {description}")]
    RateLimited {
        retry_after_secs: u64,
        description: String,
    },
    #[error("Error sending message")]
    Delivery(#[from] DeliveryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingFields => {
                let body = Json(json!({"error": self.to_string()}));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::RateLimited {
                retry_after_secs,
                ref description,
            } => {
                let body = Json(json!({"error": format!("Rate limit exceeded: {}", description)}));
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, retry_after_secs.to_string())],
                    body,
                )
                    .into_response()
            }
            ApiError::Delivery(ref cause) => {
                // Cause stays in the server log, the caller gets a generic body
                error!(%cause, "error sending webhook");
                let body = Json(json!({"error": self.to_string()}));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
