use dashmap::DashMap;
use std::sync::Arc;

use crate::clock::Clock;

/// Rate limits applied to /contact, evaluated smallest window first.
pub const CONTACT_LIMITS: [Limit; 3] = [
    Limit { window_secs: 60, max_requests: 3 },
    Limit { window_secs: 3600, max_requests: 10 },
    Limit { window_secs: 86400, max_requests: 20 },
];

/// One fixed-window limit: at most `max_requests` per `window_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub window_secs: u64,
    pub max_requests: u32,
}

impl Limit {
    // Human-readable form used in 429 bodies, e.g. "3 per 1 minute"
    pub fn describe(&self) -> String {
        let period = match self.window_secs {
            60 => "1 minute".to_string(),
            3600 => "1 hour".to_string(),
            86400 => "1 day".to_string(),
            secs => format!("{} seconds", secs),
        };
        format!("{} per {}", self.max_requests, period)
    }
}

// Per-client counter for one window size
#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    window_start: u64,
    count: u32,
}

/// Outcome of a single admit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied {
        retry_after_secs: u64,
        description: String,
    },
}

/// Fixed-window rate limiter keyed by client, with several windows enforced
/// at once. Windows are aligned to fixed-size slices since the Unix epoch.
/// Cloning shares the underlying state.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<RateLimiterInner>,
}

struct RateLimiterInner {
    limits: Vec<Limit>,
    clients: DashMap<String, Vec<WindowCounter>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(limits: &[Limit], clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RateLimiterInner {
                limits: limits.to_vec(),
                clients: DashMap::new(),
                clock,
            }),
        }
    }

    /// Check-and-increment for one request from `client_key`.
    ///
    /// All windows are checked before any counter moves: a denial leaves every
    /// counter untouched, and an admission increments all of them. The dashmap
    /// entry guard makes this atomic per client without a global lock.
    pub fn admit(&self, client_key: &str) -> Decision {
        let now = self.inner.clock.now_secs();

        let mut entry = self
            .inner
            .clients
            .entry(client_key.to_string())
            .or_insert_with(|| {
                self.inner
                    .limits
                    .iter()
                    .map(|limit| WindowCounter {
                        window_start: aligned_start(now, limit.window_secs),
                        count: 0,
                    })
                    .collect()
            });

        let counters = entry.value_mut();

        // Roll expired windows forward to the interval containing `now`
        for (limit, counter) in self.inner.limits.iter().zip(counters.iter_mut()) {
            let start = aligned_start(now, limit.window_secs);
            if counter.window_start != start {
                counter.window_start = start;
                counter.count = 0;
            }
        }

        // First exceeded window (smallest first) decides the denial
        for (limit, counter) in self.inner.limits.iter().zip(counters.iter()) {
            if counter.count >= limit.max_requests {
                return Decision::Denied {
                    retry_after_secs: counter.window_start + limit.window_secs - now,
                    description: limit.describe(),
                };
            }
        }

        for counter in counters.iter_mut() {
            counter.count += 1;
        }
        Decision::Allowed
    }

    /// Drop clients whose windows have all expired. Run periodically so the
    /// per-client map stays bounded in long-running deployments.
    pub fn sweep(&self) {
        let now = self.inner.clock.now_secs();
        let limits = self.inner.limits.clone();
        self.inner.clients.retain(|_, counters| {
            limits.iter().zip(counters.iter()).any(|(limit, counter)| {
                counter.count > 0 && counter.window_start == aligned_start(now, limit.window_secs)
            })
        });
    }

    pub fn tracked_clients(&self) -> usize {
        self.inner.clients.len()
    }
}

fn aligned_start(now: u64, window_secs: u64) -> u64 {
    now - now % window_secs
}
