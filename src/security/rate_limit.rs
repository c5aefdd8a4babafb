//! Global fixed-window rate limiting.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures_util::future::{self, BoxFuture, FutureExt};
use tokio::time::Instant;

use crate::config::RateLimitConfig;
use crate::pipeline::{PipelineError, RequestContext, Stage};

/// One counting window.
#[derive(Debug, Clone, Copy)]
struct Window {
    opened_at: Instant,
    admitted: u32,
}

/// A single request budget shared by every caller.
///
/// A window opens at the first request after the previous one expired and
/// admits at most `max_requests` requests until `window` has elapsed.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    current: Mutex<Option<Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            current: Mutex::new(None),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests, Duration::from_secs(config.window_secs))
    }

    /// Admit or reject one request. Check and increment happen under one lock.
    pub fn admit(&self) -> Result<(), PipelineError> {
        let now = Instant::now();
        // The window is plain data; a panic elsewhere cannot leave it torn.
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        if current.is_some_and(|w| now.duration_since(w.opened_at) >= self.window) {
            *current = None;
        }
        let window = current.get_or_insert(Window {
            opened_at: now,
            admitted: 0,
        });

        if window.admitted < self.max_requests {
            window.admitted += 1;
            Ok(())
        } else {
            Err(PipelineError::TooManyRequests)
        }
    }
}

impl Stage for RateLimiter {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn handle<'a>(&'a self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<(), PipelineError>> {
        future::ready(self.admit()).boxed()
    }
}
