//! Core rate limiter implementation

use super::types::{Bucket, RateLimitResult};
use crate::config::models::rate_limit::RateLimitConfig;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// Rate limiter keyed by caller identity
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Rate limit configuration
    config: RateLimitConfig,
    /// Buckets by identity (API key id or `ip:<addr>`)
    buckets: Arc<DashMap<String, Bucket>>,
}

fn to_reset_at(secs: f64) -> chrono::DateTime<Utc> {
    let millis = (secs * 1000.0).ceil() as i64;
    Utc::now() + chrono::Duration::milliseconds(millis)
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(DashMap::new()),
        }
    }

    /// Budget applied to callers without their own
    pub fn default_budget(&self) -> u32 {
        self.config.default_rpm
    }

    /// Consume one token for `identity` if available
    pub fn check(&self, identity: &str, budget: u32) -> RateLimitResult {
        self.check_at(identity, budget, Instant::now())
    }

    pub(crate) fn check_at(&self, identity: &str, budget: u32, now: Instant) -> RateLimitResult {
        let budget = budget.max(1);
        if !self.config.enabled {
            return Self::unlimited(budget);
        }

        let capacity = f64::from(budget);
        // The entry guard holds the shard lock, so refill and consume are atomic
        let mut bucket = self
            .buckets
            .entry(identity.to_string())
            .or_insert_with(|| Bucket::full(capacity, now));
        bucket.refill(capacity, now);

        let allowed = bucket.tokens >= 1.0;
        if allowed {
            bucket.tokens -= 1.0;
        }

        let tokens = bucket.tokens;
        let reset_at = if !allowed {
            Some(to_reset_at(bucket.secs_until_token(tokens)))
        } else if tokens < bucket.capacity {
            Some(to_reset_at(bucket.secs_until_full(tokens)))
        } else {
            None
        };
        drop(bucket);

        if !allowed {
            debug!("Rate limit exceeded for {} (budget {})", identity, budget);
        }

        RateLimitResult {
            allowed,
            limit: budget,
            remaining: if allowed { tokens.floor() as u32 } else { 0 },
            reset_at,
        }
    }

    /// Peek at the bucket without consuming a token
    pub fn status(&self, identity: &str, budget: u32) -> RateLimitResult {
        self.status_at(identity, budget, Instant::now())
    }

    pub(crate) fn status_at(&self, identity: &str, budget: u32, now: Instant) -> RateLimitResult {
        let budget = budget.max(1);
        if !self.config.enabled {
            return Self::unlimited(budget);
        }

        let Some(bucket) = self.buckets.get(identity) else {
            return Self::unlimited(budget);
        };

        let tokens = bucket.tokens_at(now).min(f64::from(budget));
        let reset_at = if tokens < 1.0 {
            Some(to_reset_at(bucket.secs_until_token(tokens)))
        } else if tokens < bucket.capacity {
            Some(to_reset_at(bucket.secs_until_full(tokens)))
        } else {
            None
        };

        RateLimitResult {
            allowed: tokens >= 1.0,
            limit: budget,
            remaining: tokens.floor() as u32,
            reset_at,
        }
    }

    /// Drop the bucket for `identity`; the next call starts full
    pub fn reset(&self, identity: &str) {
        if self.buckets.remove(identity).is_some() {
            debug!("Rate limit bucket reset for {}", identity);
        }
    }

    /// Remove buckets that have refilled completely
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.buckets
            .retain(|_, bucket| bucket.tokens_at(now) < bucket.capacity);
    }

    /// Number of tracked identities
    pub fn tracked_identities(&self) -> usize {
        self.buckets.len()
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                self.cleanup();
            }
        })
    }

    fn unlimited(budget: u32) -> RateLimitResult {
        RateLimitResult {
            allowed: true,
            limit: budget,
            remaining: budget,
            reset_at: None,
        }
    }
}
