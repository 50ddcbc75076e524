//! Per-client request limits over sliding windows.
//!
//! Every accepted request leaves a timestamp in its client's log. A request is rejected when any
//! window already holds as many timestamps as it allows. The log only has to remember the longest
//! window, so older entries are dropped on every check and by a periodic full sweep.

use crate::modules::error::ApiError;
use axum::{
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// Full sweeps run once per this many checks.
const SWEEP_INTERVAL: usize = 1024;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub per_minute: usize,
    pub per_hour: usize,
    pub per_day: usize,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            per_minute: 10,
            per_hour: 50,
            per_day: 200,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    period: Duration,
    limit: usize,
}

#[derive(Debug, Default)]
struct LimiterState {
    hits: HashMap<String, VecDeque<Instant>>,
    checks: usize,
}

impl LimiterState {
    fn sweep(&mut self, now: Instant, horizon: Duration) {
        self.hits.retain(|_, log| {
            prune(log, now, horizon);
            !log.is_empty()
        });
    }
}

fn prune(log: &mut VecDeque<Instant>, now: Instant, horizon: Duration) {
    while let Some(&oldest) = log.front() {
        if now.duration_since(oldest) >= horizon {
            log.pop_front();
        } else {
            break;
        }
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    windows: Vec<Window>,
    horizon: Duration,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        let windows = vec![
            Window {
                period: MINUTE,
                limit: policy.per_minute,
            },
            Window {
                period: HOUR,
                limit: policy.per_hour,
            },
            Window {
                period: DAY,
                limit: policy.per_day,
            },
        ];

        Self {
            windows,
            horizon: DAY,
            state: Mutex::new(LimiterState::default()),
        }
    }

    /// Records a request from `client`, or returns how long it has to wait before a slot frees up.
    pub fn check(&self, client: &str) -> Result<(), Duration> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> Result<(), Duration> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        state.checks += 1;
        if state.checks >= SWEEP_INTERVAL {
            state.sweep(now, self.horizon);
            state.checks = 0;
        }

        let log = state.hits.entry(client.to_string()).or_default();
        prune(log, now, self.horizon);

        for window in self.windows.iter() {
            let in_window = log
                .iter()
                .rev()
                .take_while(|&&hit| now.duration_since(hit) < window.period)
                .count();
            if in_window < window.limit {
                continue;
            }

            let retry_after = if window.limit == 0 {
                window.period
            } else {
                let oldest = log[log.len() - window.limit];
                window.period.saturating_sub(now.duration_since(oldest))
            };
            return Err(retry_after);
        }

        log.push_back(now);
        Ok(())
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .hits
            .len()
    }
}

/// Requests without a peer address (e.g. behind an in-process transport) share one bucket.
fn client_key<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| String::from("unknown"))
}

/// Middleware rejecting requests over the limit before they reach a handler.
pub async fn enforce<B>(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    let client = client_key(&request);

    match limiter.check(&client) {
        Ok(()) => next.run(request).await,
        Err(wait) => {
            tracing::warn!("rate limit exceeded for {} on {}", client, request.uri());
            let retry_after = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
            ApiError::RateLimited {
                retry_after: retry_after.max(1),
            }
            .into_response()
        }
    }
}
