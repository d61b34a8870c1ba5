use std::time::{SystemTime, UNIX_EPOCH};

/// Time source for the rate limiter, in whole seconds since the Unix epoch.
/// Abstracted so tests can drive the limiter with a controllable clock.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}

// Default clock backed by the system time
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
