use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use crate::error::ApiError;
use crate::extract::{ClientKey, SubmittedFields};
use crate::metrics::{
    CONTACT_RATE_LIMITED_TOTAL, CONTACT_REQUESTS_TOTAL, REQUEST_LATENCY, WEBHOOK_FAILURES_TOTAL,
};
use crate::rate_limit::Decision;
use crate::state::AppState;

pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    ClientKey(client_key): ClientKey,
    SubmittedFields(fields): SubmittedFields,
) -> Result<Json<Value>, ApiError> {
    CONTACT_REQUESTS_TOTAL.inc();
    let start_time = Instant::now();

    // Admission is charged before validation, so invalid requests still count
    if let Decision::Denied {
        retry_after_secs,
        description,
    } = state.limiter.admit(&client_key)
    {
        CONTACT_RATE_LIMITED_TOTAL.inc();
        warn!(client = %client_key, %description, "rate limit exceeded");
        return Err(ApiError::RateLimited {
            retry_after_secs,
            description,
        });
    }

    let submission = fields.validate().ok_or(ApiError::MissingFields)?;

    let result = state.sink.notify(&submission).await;
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    if let Err(cause) = result {
        WEBHOOK_FAILURES_TOTAL.inc();
        return Err(ApiError::Delivery(cause));
    }

    Ok(Json(json!({"message": "Message sent successfully"})))
}
