//! Bounded retry pacing shared by the routing resolver and the payment client.

use std::time::Duration;

/// How the pause between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same pause after every failed attempt.
    Fixed,
    /// `base * 2^attempt`, attempt counted from zero.
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub const DEFAULT_ATTEMPTS: u32 = 3;

    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: delay,
            backoff: Backoff::Fixed,
        }
    }

    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff: Backoff::Exponential,
        }
    }

    /// Pause to take after the zero-based `attempt` failed, or `None` if it was the last one.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts {
            return None;
        }
        Some(match self.backoff {
            Backoff::Fixed => self.base_delay,
            Backoff::Exponential => self.base_delay.saturating_mul(2u32.saturating_pow(attempt)),
        })
    }

    /// Wait out the pause after a failed `attempt`. Returns `false` when no attempts remain.
    pub async fn pause(&self, attempt: u32) -> bool {
        match self.delay_after(attempt) {
            Some(delay) => {
                tokio::time::sleep(delay).await;
                true
            }
            None => false,
        }
    }
}
