//! Sliding-window limiter for the real-time quote endpoint - 5 requests per minute
use lazy_static::lazy_static;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const QUOTE_MAX_REQUESTS: usize = 5;
pub const QUOTE_WINDOW: Duration = Duration::from_secs(60);

lazy_static! {
    static ref QUOTE_RATE_LIMITER: Mutex<RateLimiter> = Mutex::new(RateLimiter::new(QUOTE_MAX_REQUESTS, QUOTE_WINDOW));
}

pub struct RateLimiter {
    /// Timestamps of requests inside the window
    request_times: VecDeque<Instant>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            request_times: VecDeque::new(),
            max_requests,
            window,
        }
    }

    /// Record a request at `now` if allowed, otherwise return how long until a slot frees up
    pub fn check_and_record(&mut self, now: Instant) -> Result<(), Duration> {
        while let Some(&front) = self.request_times.front() {
            if now.duration_since(front) >= self.window {
                self.request_times.pop_front();
            } else {
                break;
            }
        }

        if self.request_times.len() >= self.max_requests {
            if let Some(&oldest) = self.request_times.front() {
                return Err(self.window.saturating_sub(now.duration_since(oldest)));
            }
        }

        self.request_times.push_back(now);
        Ok(())
    }
}

/// Take a slot for a quote request; `Err` holds the wait before the next one is allowed
pub fn check_quote_rate_limit() -> Result<(), Duration> {
    let mut limiter = match QUOTE_RATE_LIMITER.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let result = limiter.check_and_record(Instant::now());
    if let Err(wait) = result {
        tracing::warn!("Quote rate limit reached, next slot in {}s", wait.as_secs());
    }
    result
}
