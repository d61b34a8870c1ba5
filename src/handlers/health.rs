use axum::Json;
use axum::response::IntoResponse;

// Liveness probe, exempt from rate limiting
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}
