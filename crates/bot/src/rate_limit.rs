//! Per-user cooldown between diagram requests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use flowchart::UserId;
use tokio::time::Instant;

/// Default minimum interval between two accepted requests of one user.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);

/// In-memory map from user to the time of their last accepted request.
///
/// Check-and-record happens under one lock, so concurrent commands from the
/// same user cannot both pass the check. State lives as long as the value.
#[derive(Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    last_request: Mutex<HashMap<UserId, Instant>>,
}

impl RateLimiter {
    /// Creates an empty limiter.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_request: Mutex::new(HashMap::new()),
        }
    }

    /// Accepts the request and records the current time, or rejects it with
    /// the time remaining until the cooldown ends.
    ///
    /// A rejection leaves the recorded time untouched. Entries whose cooldown
    /// has expired are dropped on every call.
    pub fn try_acquire(&self, user: UserId) -> Result<(), Duration> {
        let now = Instant::now();
        let mut last_request = self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        last_request.retain(|_, last| now.saturating_duration_since(*last) < self.cooldown);

        if let Some(last) = last_request.get(&user) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < self.cooldown {
                return Err(self.cooldown - elapsed);
            }
        }

        last_request.insert(user, now);
        Ok(())
    }

    /// Records the current time for `user` unconditionally.
    ///
    /// Called when processing finishes, so the cooldown runs from the end of
    /// the previous request rather than its start.
    pub fn touch(&self, user: UserId) {
        self.last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user, Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
