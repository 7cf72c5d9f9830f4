//! Rate limiter for login and OTP attempts
//!
//! Keys are caller-chosen strings such as `login:<email>` so that one
//! account's attempts never count against another's. State is in-process;
//! each auth instance limits independently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Attempts allowed inside one window
    pub max_attempts: u32,
    pub window: Duration,
    /// Lockout once the window's attempts are used up
    pub ban: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(5 * 60),
            ban: Duration::from_secs(60 * 60),
        }
    }
}

/// Outcome of recording an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Allowed,
    Limited { retry_after: Duration },
}

impl Attempt {
    /// Whole minutes until the caller may retry, rounded up
    pub fn retry_minutes(&self) -> u64 {
        match self {
            Attempt::Allowed => 0,
            Attempt::Limited { retry_after } => retry_after.as_secs().div_ceil(60).max(1),
        }
    }
}

#[derive(Debug)]
struct Window {
    attempts: u32,
    started: Instant,
    banned_until: Option<Instant>,
}

impl Window {
    fn is_stale(&self, now: Instant, config: &RateLimiterConfig) -> bool {
        let banned = self.banned_until.is_some_and(|until| now < until);
        !banned && now.duration_since(self.started) >= config.window
    }
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key`
    pub async fn attempt(&self, key: &str) -> Attempt {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();

        windows.retain(|_, window| !window.is_stale(now, &self.config));

        let window = windows.entry(key.to_string()).or_insert(Window {
            attempts: 0,
            started: now,
            banned_until: None,
        });

        if let Some(until) = window.banned_until {
            if now < until {
                return Attempt::Limited {
                    retry_after: until - now,
                };
            }
            *window = Window {
                attempts: 0,
                started: now,
                banned_until: None,
            };
        }

        if window.attempts >= self.config.max_attempts {
            window.banned_until = Some(now + self.config.ban);
            warn!("Locked out {} for {:?}", key, self.config.ban);
            return Attempt::Limited {
                retry_after: self.config.ban,
            };
        }

        window.attempts += 1;
        Attempt::Allowed
    }

    /// Forget all attempts for `key`, e.g. after a successful login
    pub async fn reset(&self, key: &str) {
        self.windows.lock().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: u32) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_locks_out_after_max_attempts() {
        let limiter = limiter(2);

        assert_eq!(limiter.attempt("login:a@example.com").await, Attempt::Allowed);
        assert_eq!(limiter.attempt("login:a@example.com").await, Attempt::Allowed);

        let limited = limiter.attempt("login:a@example.com").await;
        assert_eq!(
            limited,
            Attempt::Limited {
                retry_after: Duration::from_secs(3600)
            }
        );
        assert_eq!(limited.retry_minutes(), 60);

        assert!(matches!(
            limiter.attempt("login:a@example.com").await,
            Attempt::Limited { .. }
        ));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(1);

        assert_eq!(limiter.attempt("login:a@example.com").await, Attempt::Allowed);
        assert_ne!(limiter.attempt("login:a@example.com").await, Attempt::Allowed);
        assert_eq!(limiter.attempt("login:b@example.com").await, Attempt::Allowed);
    }

    #[tokio::test]
    async fn test_reset_clears_attempts_and_lockout() {
        let limiter = limiter(1);

        assert_eq!(limiter.attempt("otp:a@example.com").await, Attempt::Allowed);
        assert_ne!(limiter.attempt("otp:a@example.com").await, Attempt::Allowed);

        limiter.reset("otp:a@example.com").await;
        assert_eq!(limiter.attempt("otp:a@example.com").await, Attempt::Allowed);
    }

    #[tokio::test]
    async fn test_elapsed_window_starts_over() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            max_attempts: 1,
            window: Duration::ZERO,
            ban: Duration::from_secs(3600),
        });

        assert_eq!(limiter.attempt("login:c@example.com").await, Attempt::Allowed);
        assert_eq!(limiter.attempt("login:c@example.com").await, Attempt::Allowed);
        assert_eq!(limiter.windows.lock().await.len(), 1);
    }

    #[test]
    fn test_retry_minutes_round_up() {
        let limited = Attempt::Limited {
            retry_after: Duration::from_secs(61),
        };
        assert_eq!(limited.retry_minutes(), 2);

        let almost_done = Attempt::Limited {
            retry_after: Duration::from_millis(200),
        };
        assert_eq!(almost_done.retry_minutes(), 1);
        assert_eq!(Attempt::Allowed.retry_minutes(), 0);
    }
}
