use std::sync::Arc;

use crate::rate_limit::RateLimiter;
use crate::webhook::NotifySink;

// app's shared state
pub struct AppState {
    pub limiter: RateLimiter,
    pub sink: Arc<dyn NotifySink>,
}
