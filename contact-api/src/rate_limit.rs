//! Fixed-window rate limiting for the listing endpoint.
//!
//! Each identity gets `max_requests` per window; the window starts with the
//! identity's first request and resets once it has elapsed. The number of
//! tracked identities is capped; expired windows are dropped when the cap is
//! reached.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::ContactError;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests allowed per window. Default: 30.
    pub max_requests: u32,
    /// Default: 60 seconds.
    pub window: Duration,
    /// Hard cap on identities tracked at once. Default: 10,000.
    pub max_tracked: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(60),
            max_tracked: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Records one request for `identity`.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::RateLimited` once the identity has used up its
    /// window, or when a new identity arrives while the tracking cap is full.
    pub fn check(&self, identity: &str) -> Result<(), ContactError> {
        self.check_at(identity, Instant::now())
    }

    /// [`RateLimiter::check`] with an explicit clock reading.
    ///
    /// # Errors
    ///
    /// See [`RateLimiter::check`].
    pub fn check_at(&self, identity: &str, now: Instant) -> Result<(), ContactError> {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if !windows.contains_key(identity) && windows.len() >= self.config.max_tracked {
            windows.retain(|_, w| now < w.reset_at);
            if windows.len() >= self.config.max_tracked {
                tracing::warn!(
                    tracked = windows.len(),
                    max_tracked = self.config.max_tracked,
                    "rejecting new identity: tracking cap reached"
                );
                return Err(ContactError::RateLimited);
            }
        }

        match windows.get_mut(identity) {
            Some(window) if now < window.reset_at => {
                if window.count >= self.config.max_requests {
                    tracing::warn!(
                        identity,
                        requests = window.count,
                        max = self.config.max_requests,
                        "rate limit exceeded"
                    );
                    return Err(ContactError::RateLimited);
                }
                window.count += 1;
            },
            _ => {
                windows.insert(
                    identity.to_owned(),
                    Window {
                        count: 1,
                        reset_at: now + self.config.window,
                    },
                );
            },
        }
        Ok(())
    }

    pub fn tracked(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
