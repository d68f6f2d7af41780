//! Sliding-window login rate limiting.
//!
//! Attempts are tracked per client identifier. A single mutex guards the
//! whole log; every call is a short, non-blocking critical section.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Attempts allowed inside one window.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Width of the trailing window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Per-client sliding-window attempt limiter.
#[derive(Debug)]
pub struct RateLimiter {
    max_attempts: usize,
    window: Duration,
    attempts: Mutex<HashMap<String, Vec<Instant>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    /// Allow `max_attempts` per trailing `window`.
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt for `client` now. Returns `false` if the client has
    /// already used up its window; rejected attempts are not recorded.
    pub fn check_and_record(&self, client: &str) -> bool {
        self.check_and_record_at(client, Instant::now())
    }

    /// [`check_and_record`](Self::check_and_record) at an explicit instant.
    pub fn check_and_record_at(&self, client: &str, now: Instant) -> bool {
        let mut attempts = self.lock();
        let entries = attempts.entry(client.to_string()).or_default();
        entries.retain(|&at| now.saturating_duration_since(at) < self.window);

        if entries.len() >= self.max_attempts {
            return false;
        }

        entries.push(now);
        true
    }

    /// Drop every client whose attempts have all expired. Returns how many
    /// clients were removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut attempts = self.lock();
        let before = attempts.len();
        attempts.retain(|_, entries| {
            entries.retain(|&at| now.saturating_duration_since(at) < self.window);
            !entries.is_empty()
        });
        before - attempts.len()
    }

    /// Number of client identifiers currently held.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Instant>>> {
        // The map holds no invariant a panicking holder could break halfway.
        self.attempts.lock().unwrap_or_else(|e| e.into_inner())
    }
}
