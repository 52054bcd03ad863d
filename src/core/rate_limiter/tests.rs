//! Tests for rate limiter

#[cfg(test)]
mod tests {
    use super::super::limiter::RateLimiter;
    use crate::config::models::rate_limit::RateLimitConfig;
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn test_config(enabled: bool) -> RateLimitConfig {
        RateLimitConfig {
            enabled,
            default_rpm: 300,
        }
    }

    #[test]
    fn test_rate_limiter_disabled() {
        let limiter = RateLimiter::new(test_config(false));

        for _ in 0..100 {
            let result = limiter.check("key", 1);
            assert!(result.allowed);
        }
    }

    #[test]
    fn test_exact_budget_is_admitted() {
        let limiter = RateLimiter::new(test_config(true));
        let now = Instant::now();

        for i in 0..10 {
            let result = limiter.check_at("key", 10, now);
            assert!(result.allowed, "Request {} should be allowed", i);
            assert_eq!(result.remaining, 9 - i);
        }
    }

    #[test]
    fn test_over_budget_is_denied() {
        let limiter = RateLimiter::new(test_config(true));
        let now = Instant::now();

        assert!(limiter.check_at("key", 2, now).allowed);
        assert!(limiter.check_at("key", 2, now).allowed);

        let denied = limiter.check_at("key", 2, now);
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);

        let reset_at = denied.reset_at.expect("denied result carries reset time");
        assert!(reset_at > Utc::now());
        assert!(reset_at <= Utc::now() + chrono::Duration::seconds(60));
    }

    #[test]
    fn test_partial_bucket_reports_refill_time() {
        let limiter = RateLimiter::new(test_config(true));
        let now = Instant::now();

        let first = limiter.check_at("key", 60, now);
        assert!(first.allowed);
        let reset_at = first.reset_at.expect("partial bucket carries reset time");
        assert!(reset_at > Utc::now());
        assert!(reset_at <= Utc::now() + chrono::Duration::seconds(2));

        let status = limiter.status_at("key", 60, now);
        assert!(status.reset_at.is_some());
        assert!(limiter.status_at("unseen", 60, now).reset_at.is_none());
    }

    #[test]
    fn test_continuous_refill() {
        let limiter = RateLimiter::new(test_config(true));
        let start = Instant::now();

        // Budget 60 refills one token per second
        for _ in 0..60 {
            assert!(limiter.check_at("key", 60, start).allowed);
        }
        assert!(!limiter.check_at("key", 60, start).allowed);

        let later = start + Duration::from_millis(1500);
        assert!(limiter.check_at("key", 60, later).allowed);
        assert!(!limiter.check_at("key", 60, later).allowed);
    }

    #[test]
    fn test_refill_never_exceeds_capacity() {
        let limiter = RateLimiter::new(test_config(true));
        let start = Instant::now();
        limiter.check_at("key", 5, start);

        let status = limiter.status_at("key", 5, start + Duration::from_secs(3600));
        assert_eq!(status.remaining, 5);
        assert!(status.reset_at.is_none());
    }

    #[test]
    fn test_status_does_not_consume() {
        let limiter = RateLimiter::new(test_config(true));
        let now = Instant::now();
        limiter.check_at("key", 3, now);

        assert_eq!(limiter.status_at("key", 3, now).remaining, 2);
        assert_eq!(limiter.status_at("key", 3, now).remaining, 2);
        assert_eq!(limiter.status("unknown", 3).remaining, 3);
    }

    #[test]
    fn test_status_is_monotonic() {
        let limiter = RateLimiter::new(test_config(true));
        let start = Instant::now();
        for _ in 0..30 {
            limiter.check_at("key", 30, start);
        }

        let mut previous = 0;
        for step in 0..20 {
            let at = start + Duration::from_millis(step * 700);
            let remaining = limiter.status_at("key", 30, at).remaining;
            assert!(remaining >= previous);
            previous = remaining;
        }
    }

    #[test]
    fn test_identities_are_isolated() {
        let limiter = RateLimiter::new(test_config(true));
        let now = Instant::now();

        assert!(limiter.check_at("a", 1, now).allowed);
        assert!(!limiter.check_at("a", 1, now).allowed);
        assert!(limiter.check_at("b", 1, now).allowed);
    }

    #[test]
    fn test_reset_restores_budget() {
        let limiter = RateLimiter::new(test_config(true));
        let now = Instant::now();

        assert!(limiter.check_at("key", 1, now).allowed);
        assert!(!limiter.check_at("key", 1, now).allowed);

        limiter.reset("key");
        assert!(limiter.check_at("key", 1, now).allowed);
    }

    #[test]
    fn test_cleanup_keeps_partial_buckets() {
        let limiter = RateLimiter::new(test_config(true));
        limiter.check("busy", 100);
        limiter.cleanup();
        assert_eq!(limiter.tracked_identities(), 1);

        if let Some(long_ago) = Instant::now().checked_sub(Duration::from_secs(120)) {
            limiter.check_at("idle", 100, long_ago);
            limiter.cleanup();
            assert_eq!(limiter.tracked_identities(), 1);
        }
    }

    #[tokio::test]
    async fn test_concurrent_consumption_is_atomic() {
        let limiter = Arc::new(RateLimiter::new(test_config(true)));
        let mut handles = Vec::new();

        for _ in 0..50 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move { limiter.check("burst", 20).allowed }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        // A few tokens may refill while the tasks run
        assert!((20..=21).contains(&admitted), "admitted {}", admitted);
    }
}
