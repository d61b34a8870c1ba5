use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::clock::Clock;
use crate::error::DeliveryError;
use crate::models::ContactSubmission;
use crate::rate_limit::{CONTACT_LIMITS, RateLimiter};
use crate::router;
use crate::state::AppState;
use crate::webhook::NotifySink;

// Frozen mid-window clock so rapid requests never straddle a minute boundary
struct FrozenClock(u64);

impl Clock for FrozenClock {
    fn now_secs(&self) -> u64 {
        self.0
    }
}

// Sink that records every submission and optionally fails
#[derive(Default)]
struct RecordingSink {
    calls: Mutex<Vec<ContactSubmission>>,
    fail: bool,
}

impl RecordingSink {
    fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn calls(&self) -> Vec<ContactSubmission> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotifySink for RecordingSink {
    async fn notify(&self, submission: &ContactSubmission) -> Result<(), DeliveryError> {
        self.calls.lock().unwrap().push(submission.clone());
        if self.fail {
            Err(DeliveryError::Status(reqwest::StatusCode::BAD_GATEWAY))
        } else {
            Ok(())
        }
    }
}

fn app_with(sink: Arc<RecordingSink>) -> Router {
    let state = Arc::new(AppState {
        limiter: RateLimiter::new(&CONTACT_LIMITS, Arc::new(FrozenClock(1_000_000))),
        sink,
    });
    router(state)
}

fn client(addr: [u8; 4]) -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::from((addr, 4242)))
}

fn post_form(form: &str, addr: [u8; 4]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/contact")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .extension(client(addr))
        .body(Body::from(form.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

const VALID_FORM: &str = "email=jane%40example.com&subject=Hello&message=How%27s+it+going%3F";

#[tokio::test]
async fn health_returns_ok() {
    let app = app_with(Arc::new(RecordingSink::default()));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn missing_field_is_rejected_without_delivery() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with(sink.clone());

    let response = app
        .oneshot(post_form("email=jane%40example.com&subject=Hello", [9, 9, 9, 9]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "Email, Subject and message are required"})
    );
    assert!(sink.calls().is_empty());
}

#[tokio::test]
async fn empty_field_is_rejected() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with(sink.clone());

    let response = app
        .oneshot(post_form("email=jane%40example.com&subject=&message=hi", [9, 9, 9, 9]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(sink.calls().is_empty());
}

#[tokio::test]
async fn valid_submission_is_forwarded_once() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with(sink.clone());

    let response = app.oneshot(post_form(VALID_FORM, [9, 9, 9, 9])).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"message": "Message sent successfully"})
    );

    // Exactly one delivery, fields passed through unmodified
    assert_eq!(
        sink.calls(),
        vec![ContactSubmission {
            email: "jane@example.com".to_string(),
            subject: "Hello".to_string(),
            message: "How's it going?".to_string(),
        }]
    );
}

#[tokio::test]
async fn query_fields_are_accepted() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with(sink.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/contact?email=jane%40example.com&subject=Hello&message=hi")
        .extension(client([9, 9, 9, 9]))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(sink.calls().len(), 1);
    assert_eq!(sink.calls()[0].message, "hi");
}

#[tokio::test]
async fn delivery_failure_returns_generic_500() {
    let sink = Arc::new(RecordingSink::failing());
    let app = app_with(sink.clone());

    let response = app.oneshot(post_form(VALID_FORM, [9, 9, 9, 9])).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    // The caller never sees the underlying cause
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"error": "Error sending message"})
    );
    assert_eq!(sink.calls().len(), 1);
}

#[tokio::test]
async fn fourth_request_is_rate_limited() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with(sink.clone());

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(post_form(VALID_FORM, [1, 2, 3, 4]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(post_form(VALID_FORM, [1, 2, 3, 4]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("3 per 1 minute"));

    // The exhausted client made it through exactly three times
    assert_eq!(sink.calls().len(), 3);

    // Another client is unaffected
    let response = app
        .oneshot(post_form(VALID_FORM, [5, 6, 7, 8]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn invalid_requests_still_count_against_the_limit() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with(sink.clone());

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(post_form("subject=Hello", [1, 2, 3, 4]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .oneshot(post_form("subject=Hello", [1, 2, 3, 4]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(sink.calls().is_empty());
}

#[tokio::test]
async fn health_is_exempt_from_rate_limiting() {
    let app = app_with(Arc::new(RecordingSink::default()));

    for _ in 0..4 {
        app.clone()
            .oneshot(post_form(VALID_FORM, [1, 2, 3, 4]))
            .await
            .unwrap();
    }

    let request = Request::get("/health")
        .extension(client([1, 2, 3, 4]))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn requests_without_a_remote_address_share_the_sentinel_bucket() {
    let sink = Arc::new(RecordingSink::default());
    let app = app_with(sink.clone());

    // No ConnectInfo extension at all; the limiter must still apply
    for _ in 0..3 {
        let request = Request::builder()
            .method("POST")
            .uri("/contact")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(VALID_FORM))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let request = Request::builder()
        .method("POST")
        .uri("/contact")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(VALID_FORM))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}
