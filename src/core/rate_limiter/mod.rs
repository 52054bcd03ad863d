//! Per-identity token bucket rate limiting
//!
//! Buckets hold `budget` tokens and refill continuously at `budget` tokens per
//! 60 seconds. They live in process memory only.

mod limiter;
mod types;

#[cfg(test)]
mod tests;

pub use limiter::RateLimiter;
pub use types::RateLimitResult;
