use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};

lazy_static! {
    pub static ref CONTACT_REQUESTS_TOTAL: Counter = register_counter!(
        "contact_requests_total",
        "Total number of requests to /contact"
    )
    .unwrap();
    pub static ref CONTACT_RATE_LIMITED_TOTAL: Counter = register_counter!(
        "contact_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref WEBHOOK_FAILURES_TOTAL: Counter = register_counter!(
        "contact_webhook_failures_total",
        "Failed webhook deliveries"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "contact_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
}
