//! Fixed-window rate limiting per client.
//!
//! Each client key gets a window that opens on its first request. Requests
//! inside the window are counted; once the count reaches the limit further
//! requests are refused until the window ends. Window state lives in a TTL
//! cache whose entry lifetime equals the window, so idle clients are evicted
//! without a sweeper task.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use moka::sync::Cache as MokaCache;

/// Configuration for the rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests allowed per window.
    pub max_requests: u32,

    /// Window length.
    pub window: Duration,

    /// Maximum number of tracked clients.
    pub max_clients: u64,

    /// Key clients by `X-Forwarded-For` instead of the peer address. Only
    /// safe behind a proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl RateLimitConfig {
    /// Set the requests allowed per window.
    pub fn with_max_requests(mut self, max_requests: u32) -> Self {
        self.max_requests = max_requests;
        self
    }

    /// Set the window length.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Trust the `X-Forwarded-For` header for client identity.
    pub fn with_trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window: Duration::from_secs(60),
            max_clients: 100_000,
            trust_forwarded_for: false,
        }
    }
}

/// Outcome of checking one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,

    /// Requests allowed per window
    pub limit: u32,

    /// Requests left in the current window
    pub remaining: u32,

    /// When the current window ends
    pub reset_at: SystemTime,
}

impl RateLimitDecision {
    /// Window end as milliseconds since the Unix epoch.
    pub fn reset_epoch_ms(&self) -> u128 {
        self.reset_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0)
    }

    /// Whole seconds until the window ends, rounded up, as of `now`.
    pub fn retry_after_secs(&self, now: SystemTime) -> u64 {
        let wait = self.reset_at.duration_since(now).unwrap_or_default();
        wait.as_millis().div_ceil(1000) as u64
    }
}

#[derive(Debug)]
struct Window {
    count: u32,
    reset_at: SystemTime,
}

/// Fixed-window rate limiter keyed by client.
pub struct RateLimiter {
    windows: MokaCache<String, Arc<Mutex<Window>>>,
    max_requests: u32,
    window: Duration,
    trust_forwarded_for: bool,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let windows = MokaCache::builder()
            .time_to_live(config.window)
            .max_capacity(config.max_clients)
            .build();

        Self {
            windows,
            max_requests: config.max_requests,
            window: config.window,
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    /// Whether client keys may come from `X-Forwarded-For`.
    pub fn trusts_forwarded_for(&self) -> bool {
        self.trust_forwarded_for
    }

    /// Record a request from `key` now.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, SystemTime::now())
    }

    /// Record a request from `key` at `now`.
    pub fn check_at(&self, key: &str, now: SystemTime) -> RateLimitDecision {
        let entry = self.windows.get_with(key.to_string(), || {
            Arc::new(Mutex::new(Window {
                count: 0,
                reset_at: now + self.window,
            }))
        });

        // A poisoned window only means another request panicked mid-update;
        // the counter itself is still usable.
        let mut window = entry.lock().unwrap_or_else(|e| e.into_inner());

        if now >= window.reset_at {
            window.count = 0;
            window.reset_at = now + self.window;
        }

        let allowed = window.count < self.max_requests;
        if allowed {
            window.count += 1;
        }

        RateLimitDecision {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests - window.count,
            reset_at: window.reset_at,
        }
    }

    /// Number of clients currently tracked (approximate).
    pub fn tracked_clients(&self) -> u64 {
        self.windows.run_pending_tasks();
        self.windows.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(
            &RateLimitConfig::default()
                .with_max_requests(max)
                .with_window(Duration::from_secs(window_secs)),
        )
    }

    #[test]
    fn default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 20);
        assert_eq!(config.window, Duration::from_secs(60));
        assert!(!config.trust_forwarded_for);
    }

    #[test]
    fn allows_up_to_limit_then_refuses() {
        let limiter = limiter(3, 60);
        let now = SystemTime::now();

        let remaining: Vec<_> = (0..3)
            .map(|_| limiter.check_at("1.2.3.4", now))
            .inspect(|d| assert!(d.allowed))
            .map(|d| d.remaining)
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);

        let refused = limiter.check_at("1.2.3.4", now);
        assert!(!refused.allowed);
        assert_eq!(refused.remaining, 0);
        assert_eq!(refused.limit, 3);
    }

    #[test]
    fn window_reset_allows_again() {
        let limiter = limiter(2, 60);
        let start = SystemTime::now();

        limiter.check_at("client", start);
        limiter.check_at("client", start);
        assert!(!limiter.check_at("client", start + Duration::from_secs(30)).allowed);

        let later = start + Duration::from_secs(61);
        let decision = limiter.check_at("client", later);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
        assert_eq!(decision.reset_at, later + Duration::from_secs(60));
    }

    #[test]
    fn clients_are_independent() {
        let limiter = limiter(1, 60);
        let now = SystemTime::now();

        assert!(limiter.check_at("a", now).allowed);
        assert!(!limiter.check_at("a", now).allowed);
        assert!(limiter.check_at("b", now).allowed);
    }

    #[test]
    fn reset_is_fixed_from_first_request() {
        let limiter = limiter(5, 60);
        let start = SystemTime::now();

        let first = limiter.check_at("client", start);
        let second = limiter.check_at("client", start + Duration::from_secs(10));
        assert_eq!(first.reset_at, second.reset_at);
        assert_eq!(first.reset_at, start + Duration::from_secs(60));
    }

    #[test]
    fn retry_after_rounds_up() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);
        let decision = RateLimitDecision {
            allowed: false,
            limit: 20,
            remaining: 0,
            reset_at: now + Duration::from_millis(1_500),
        };
        assert_eq!(decision.retry_after_secs(now), 2);
        assert_eq!(decision.retry_after_secs(now + Duration::from_secs(5)), 0);
        assert_eq!(decision.reset_epoch_ms(), 1_001_500);
    }

    #[test]
    fn zero_limit_refuses_everything() {
        let limiter = limiter(0, 60);
        let decision = limiter.check("anyone");
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[test]
    fn tracks_clients() {
        let limiter = limiter(5, 60);
        limiter.check("a");
        limiter.check("b");
        limiter.check("a");
        assert_eq!(limiter.tracked_clients(), 2);
    }
}
