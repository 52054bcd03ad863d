//! Rate limiter types and data structures

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Length of the budget window
pub(super) const WINDOW: Duration = Duration::from_secs(60);

/// Rate limit result
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Bucket capacity
    pub limit: u32,
    /// Whole tokens left after this request
    pub remaining: u32,
    /// When denied: when one token will be available.
    /// When allowed: when the bucket will be full again, if it is not already.
    pub reset_at: Option<DateTime<Utc>>,
}

/// Token bucket for a single identity
#[derive(Debug, Clone)]
pub(super) struct Bucket {
    pub(super) capacity: f64,
    pub(super) tokens: f64,
    pub(super) last_refill: Instant,
}

impl Bucket {
    pub(super) fn full(capacity: f64, now: Instant) -> Self {
        Self {
            capacity,
            tokens: capacity,
            last_refill: now,
        }
    }

    pub(super) fn rate(&self) -> f64 {
        self.capacity / WINDOW.as_secs_f64()
    }

    /// Token count at `now` without mutating the bucket
    pub(super) fn tokens_at(&self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        (self.tokens + elapsed * self.rate()).min(self.capacity)
    }

    /// Bring the bucket up to date, adopting a changed capacity
    pub(super) fn refill(&mut self, capacity: f64, now: Instant) {
        self.tokens = self.tokens_at(now);
        self.last_refill = self.last_refill.max(now);
        if (capacity - self.capacity).abs() > f64::EPSILON {
            self.capacity = capacity;
            self.tokens = self.tokens.min(capacity);
        }
    }

    /// Seconds until at least one token is available
    pub(super) fn secs_until_token(&self, tokens: f64) -> f64 {
        ((1.0 - tokens).max(0.0)) / self.rate()
    }

    /// Seconds until the bucket is full
    pub(super) fn secs_until_full(&self, tokens: f64) -> f64 {
        ((self.capacity - tokens).max(0.0)) / self.rate()
    }
}
