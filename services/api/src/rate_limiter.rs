//! Login throttling
//!
//! Failed logins are remembered per key (the normalised email) inside a
//! sliding window. Reaching the limit locks the key out for the lockout
//! duration; a successful login forgets it.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::warn;

use crate::config::RateLimitSettings;

/// Throttle limits
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Failures tolerated inside the window
    pub max_attempts: u32,
    pub window: Duration,
    pub lockout: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(300),
            lockout: Duration::from_secs(3600),
        }
    }
}

impl From<&RateLimitSettings> for RateLimiterConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            window: Duration::from_secs(settings.window_seconds),
            lockout: Duration::from_secs(settings.ban_duration_seconds),
        }
    }
}

#[derive(Debug, Default)]
struct Failures {
    at: VecDeque<Instant>,
    locked_until: Option<Instant>,
}

impl Failures {
    /// Still locked out, or a failure inside the window
    fn is_live(&self, now: Instant, cutoff: Option<Instant>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
            || self
                .at
                .back()
                .is_some_and(|at| cutoff.is_none_or(|cutoff| *at >= cutoff))
    }

    fn forget_older_than(&mut self, cutoff: Option<Instant>) {
        let Some(cutoff) = cutoff else {
            return;
        };
        while self.at.front().is_some_and(|at| *at < cutoff) {
            self.at.pop_front();
        }
    }
}

/// Per-key login throttle, shared by clones
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    keys: Arc<Mutex<HashMap<String, Failures>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            keys: Arc::default(),
        }
    }

    /// `Err` with the remaining lockout when the key may not try now
    pub async fn check(&self, key: &str) -> Result<(), Duration> {
        let mut keys = self.keys.lock().await;
        let now = Instant::now();

        let Some(failures) = keys.get_mut(key) else {
            return Ok(());
        };

        let locked_until = failures.locked_until;
        match locked_until {
            Some(until) if now < until => Err(until - now),
            Some(_) => {
                keys.remove(key);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Remember a failed attempt; returns the lockout if this one triggered it
    pub async fn record_failure(&self, key: &str) -> Option<Duration> {
        let mut keys = self.keys.lock().await;
        let now = Instant::now();
        let cutoff = now.checked_sub(self.config.window);

        keys.retain(|_, failures| failures.is_live(now, cutoff));

        let failures = keys.entry(key.to_string()).or_default();
        failures.forget_older_than(cutoff);
        failures.at.push_back(now);

        if failures.at.len() < self.config.max_attempts as usize {
            return None;
        }

        failures.at.clear();
        failures.locked_until = Some(now + self.config.lockout);
        warn!(
            "Locked out {} for {}s after repeated login failures",
            key,
            self.config.lockout.as_secs()
        );
        Some(self.config.lockout)
    }

    /// Forget the key after a successful attempt
    pub async fn reset(&self, key: &str) {
        self.keys.lock().await.remove(key);
    }
}
