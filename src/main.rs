use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod clock;
mod config;
mod error;
mod extract;
mod handlers;
mod metrics;
mod models;
mod rate_limit;
mod state;
mod webhook;

#[cfg(test)]
mod tests;

use crate::clock::SystemClock;
use crate::config::Args;
use crate::handlers::{contact_handler, health_handler, metrics_handler};
use crate::rate_limit::{CONTACT_LIMITS, RateLimiter};
use crate::state::AppState;
use crate::webhook::WebhookSink;

// All origins are allowed on every route
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/contact", post(contact_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// this is main async function with tokio
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // parse cli arguments; startup fails here when the webhook URL is absent
    let args = Args::parse();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.webhook_timeout))
        .build()
        .unwrap();

    let limiter = RateLimiter::new(&CONTACT_LIMITS, Arc::new(SystemClock));

    // creating shared state
    let state = Arc::new(AppState {
        limiter: limiter.clone(),
        sink: Arc::new(WebhookSink::new(client, args.webhook_url.clone())),
    });

    // spawn the background sweeper that evicts expired rate-limit entries
    let sweep_interval = Duration::from_secs(args.sweep_interval);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            limiter.sweep();
            debug!(clients = limiter.tracked_clients(), "swept rate-limit entries");
        }
    });

    let app = router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    info!("Contact relay running on http://localhost:{}", args.port);
    info!("Forwarding submissions to {}", args.webhook_url);
    info!(
        "Rate limits: {}",
        CONTACT_LIMITS
            .iter()
            .map(|limit| limit.describe())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // ConnectInfo feeds the per-client key extractor
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
